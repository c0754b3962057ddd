use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::{Command, CommandOutput, DIAGNOSTIC_SEPARATOR};
use crate::error::{Error, Result};

/// What to do when a command exits successfully but its output is not a
/// usable help descriptor.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedOutput {
    /// Abort the build.
    #[default]
    Fail,
    /// Render the decoding error in place of the help.
    Inline,
}

pub trait Runner {
    fn run(&self, command: &Command) -> Result<CommandOutput>;
}

#[derive(Debug, Default, Clone)]
pub struct ShellRunner {
    pub working_dir: Option<PathBuf>,
    pub on_malformed_output: MalformedOutput,
}

impl Runner for ShellRunner {
    fn run(&self, command: &Command) -> Result<CommandOutput> {
        let result = match &self.working_dir {
            Some(dir) => command.execute_in(dir),
            None => command.get_output(),
        };
        match (result, self.on_malformed_output) {
            (Err(Error::InvalidJson { command, source }), MalformedOutput::Inline) => {
                warn!(command = %command, error = %source, "output is not JSON");
                Ok(CommandOutput::Diagnostic(format!(
                    "{}{}{}",
                    command, DIAGNOSTIC_SEPARATOR, source
                )))
            }
            (result, _) => result,
        }
    }
}

/// Outputs of the commands run during one book build.
///
/// Each distinct command is run at most once per cache; later lookups return
/// the stored output even if running it again would print something else.
/// Failed runs are not stored.
pub struct OutputCache<R: Runner = ShellRunner> {
    runner: R,
    entries: HashMap<Command, CommandOutput>,
}

impl Default for OutputCache<ShellRunner> {
    fn default() -> Self {
        Self::new(ShellRunner::default())
    }
}

impl<R: Runner> OutputCache<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            entries: HashMap::new(),
        }
    }

    pub fn lookup(&mut self, command: &Command) -> Result<&CommandOutput> {
        match self.entries.entry(command.clone()) {
            Entry::Occupied(entry) => {
                debug!(operation = "cache.lookup", status = "hit", command = %command);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!(operation = "cache.lookup", status = "miss", command = %command);
                let output = self.runner.run(command)?;
                Ok(entry.insert(output))
            }
        }
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.entries.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
