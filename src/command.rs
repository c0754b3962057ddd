use std::fmt;
use std::path::Path;
use std::process::{self, Stdio};

use cfg_if::cfg_if;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::string::normalize_newlines;

cfg_if! {
    if #[cfg(target_family = "windows")] {
        const LAUNCH_SHELL_COMMAND: &str = "cmd";
        const LAUNCH_SHELL_FLAG: &str = "/C";

        fn merged_script(line: &str) -> String {
            format!("({}) 2>&1", line)
        }
    } else {
        const LAUNCH_SHELL_COMMAND: &str = "sh";
        const LAUNCH_SHELL_FLAG: &str = "-c";

        fn merged_script(line: &str) -> String {
            format!("exec 2>&1\n{}", line)
        }
    }
}

/// Separator between the command line and its captured output in a diagnostic.
pub const DIAGNOSTIC_SEPARATOR: &str = " : ";

/// A shell command line, compared and hashed by its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    line: String,
}

/// What a command produced: decoded JSON, or text to show in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Json(Value),
    Diagnostic(String),
}

impl Command {
    pub fn new(line: impl AsRef<str>) -> Self {
        Self {
            line: line.as_ref().trim().to_string(),
        }
    }

    /// Builds a command from argv-style tokens. The tokens are joined into one
    /// line, quoting the ones the shell would otherwise split or expand, so a
    /// token list and the equivalent line are the same command.
    ///
    /// Fails on a token holding a nul byte, which no shell argument can carry.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut quoted = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            let word = shlex::try_quote(token).map_err(|_| Error::Token {
                token: token.escape_debug().to_string(),
            })?;
            quoted.push(word.into_owned());
        }
        Ok(Self::new(quoted.join(" ")))
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Runs the command in the current working directory.
    pub fn execute(&self) -> Result<CommandOutput> {
        self.run(None)
    }

    pub fn execute_in(&self, working_dir: &Path) -> Result<CommandOutput> {
        self.run(Some(working_dir))
    }

    pub fn get_output(&self) -> Result<CommandOutput> {
        self.execute()
    }

    fn run(&self, working_dir: Option<&Path>) -> Result<CommandOutput> {
        let mut command = process::Command::new(LAUNCH_SHELL_COMMAND);
        command
            .stdin(Stdio::null())
            .args([LAUNCH_SHELL_FLAG, merged_script(&self.line).as_str()]);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        debug!(operation = "command.execute", command = %self, "running");

        let output = command.output().map_err(|source| Error::Spawn {
            command: self.line.clone(),
            source,
        })?;

        if !output.status.success() {
            let captured = normalize_newlines(String::from_utf8_lossy(&output.stdout));
            debug!(
                operation = "command.execute",
                status = "failed",
                command = %self,
                exit_code = ?output.status.code(),
                "command failed"
            );
            return Ok(CommandOutput::Diagnostic(format!(
                "{}{}{}",
                self.line, DIAGNOSTIC_SEPARATOR, captured
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map(CommandOutput::Json)
            .map_err(|source| Error::InvalidJson {
                command: self.line.clone(),
                source,
            })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl From<String> for Command {
    fn from(line: String) -> Self {
        Self::new(line)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use serde_json::json;

    use super::*;

    fn hash_of(command: &Command) -> u64 {
        let mut hasher = DefaultHasher::new();
        command.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_tokens_equal_joined_line() {
        let from_tokens = Command::from_tokens(["conda", "build", "--help-json"]).unwrap();
        let from_line = Command::from("conda build --help-json");
        assert_eq!(from_tokens, from_line);
        assert_eq!(hash_of(&from_tokens), hash_of(&from_line));
    }

    #[test]
    fn test_tokens_are_quoted() {
        let tokens = vec![
            "echo".to_string(),
            "a b".to_string(),
            "it's".to_string(),
            String::new(),
        ];
        let command = Command::from_tokens(&tokens).unwrap();
        assert_ne!(command.line(), "echo a b it's");
        assert_eq!(shlex::split(command.line()), Some(tokens));
    }

    #[test]
    fn test_nul_token_rejected() {
        let err = Command::from_tokens(["echo", "a\0b"]).unwrap_err();
        assert!(matches!(err, Error::Token { .. }));
    }

    #[test]
    fn test_line_is_trimmed() {
        assert_eq!(Command::new("  ls -l \n").to_string(), "ls -l");
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_decodes_json() {
        let command = Command::new(r#"echo '{"groups": []}'"#);
        let output = command.get_output().unwrap();
        assert_eq!(output, CommandOutput::Json(json!({ "groups": [] })));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_becomes_diagnostic() {
        let command = Command::new("echo boom >&2; exit 3");
        match command.get_output().unwrap() {
            CommandOutput::Diagnostic(text) => {
                assert!(text.starts_with("echo boom >&2; exit 3 : "));
                assert!(text.contains("boom"));
            }
            other => panic!("expected a diagnostic, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_json_is_an_error() {
        let command = Command::new("echo not json");
        let err = command.get_output().unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("help.json"), r#"{"groups": [{"actions": []}]}"#)
            .unwrap();
        let output = Command::new("cat help.json").execute_in(dir.path()).unwrap();
        assert_eq!(
            output,
            CommandOutput::Json(json!({ "groups": [{ "actions": [] }] }))
        );
    }
}
