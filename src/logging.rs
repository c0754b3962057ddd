//! Logging setup for the preprocessor binary.
//!
//! mdbook reads the processed book from our stdout, so every log line goes to
//! stderr. The filter comes from `RUST_LOG` and defaults to `info`:
//!
//! ```sh
//! RUST_LOG=mdbook_command_json_output=debug mdbook build
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
