use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to launch shell for `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited successfully but did not print valid JSON")]
    InvalidJson {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("output of `{command}` is not a help descriptor")]
    Schema {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("command token `{token}` cannot be passed to a shell")]
    Token { token: String },

    #[error("invalid command-json-output directive on line {line}: {message}")]
    Directive { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
