//! This is a preprocessor for the [rust-lang mdbook](https://github.com/rust-lang/mdBook) project. It runs shell commands that describe a command-line interface as JSON and renders that description as HTML definition lists within the book.
//!
//! # Getting started
//!
//! ```sh
//! cargo install mdbook-command-json-output
//! ```
//!
//! You also have to activate the preprocessor, put this in your `book.toml` file:
//!
//! ```toml
//! [preprocessor.command-json-output]
//! ```
//!
//! # How to
//!
//! Markdown file: cli.md
//!
//! ```markdown
//! # Command line
//!
//! <!-- command-json-output anaconda --help-json -->
//!
//! ## Uploading
//!
//! <!-- command-json-output :level: 2 anaconda upload --help-json -->
//! ```
//!
//! Each command must print a JSON document shaped like this:
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "title": "Options",
//!       "description": "Options shared by *all* commands",
//!       "actions": [
//!         { "option_strings": ["-t", "--token"], "help": "Authentication token", "action": "store" },
//!         { "option_strings": [], "help": "", "action": "parsers",
//!           "choices": { "upload": "Upload a file", "login": "Log in" } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! and the directive is replaced with:
//!
//! ```html
//! <div class="cli-group-title">Options<p><p>Options shared by <em>all</em> commands</p>
//! </p></div><dl class="dl-horizontal dl-multiline docutils"><dt>-t / --token</dt><dd>Authentication token</dd><dt>login</dt><dd>Log in</dd><dt>upload</dt><dd>Upload a file</dd></dl>
//! ```
//!
//! # Details
//!
//! Commands are run with `sh -c` (`cmd /C` on Windows) with standard error merged into standard output.
//! Every distinct command runs once per build, no matter how many chapters use it.
//!
//! If a command exits with a non-zero status, its output is shown in the page inside a
//! `<pre class="command-json-output-error">` block and the build goes on.
//! If it exits successfully but does not print a help descriptor, the build fails, unless
//! `on-malformed-output = "inline"` is set, in which case the error is shown in the page as well.
//!
//! ```toml
//! [preprocessor.command-json-output]
//! working-dir = "tools"          # relative to the book root
//! on-malformed-output = "inline" # or "fail", the default
//! curly-quotes = false           # used when rendering group descriptions
//! ```
pub mod cache;
pub mod command;
pub mod directive;
pub mod error;
pub mod help;
pub mod logging;
pub mod preprocessor;
pub mod render;
mod utils;

pub use cache::{MalformedOutput, OutputCache, Runner, ShellRunner};
pub use command::{Command, CommandOutput};
pub use error::{Error, Result};
pub use preprocessor::{CommandJsonOutput, CommandJsonOutputConfig};
