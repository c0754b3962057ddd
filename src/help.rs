//! Shape of the JSON a documented command prints.
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "title": "Options",
//!       "description": "Markdown *text*",
//!       "actions": [
//!         { "option_strings": ["-h", "--help"], "help": "Show help", "action": "help" },
//!         { "option_strings": [], "help": "", "action": "parsers",
//!           "choices": { "build": "Build it", "test": "Test it" } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `choices` is read only on `parsers` actions. Other actions may carry
//! anything there (argparse dumps `null` or a list of allowed values).
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action kind whose choices are sub-commands.
pub const PARSERS_ACTION: &str = "parsers";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HelpDescriptor {
    pub groups: Vec<Group>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Group {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Action {
    #[serde(default)]
    pub option_strings: Vec<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub choices: Option<Value>,
}

impl HelpDescriptor {
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }
}

impl Action {
    pub fn is_parsers(&self) -> bool {
        self.action.as_deref() == Some(PARSERS_ACTION)
    }

    /// Sub-commands of a `parsers` action with their help, ordered by name.
    /// Empty for every other action.
    pub fn subcommands(&self) -> Vec<(&str, String)> {
        if !self.is_parsers() {
            return Vec::new();
        }
        let mut subcommands = match &self.choices {
            Some(Value::Object(choices)) => choices
                .iter()
                .map(|(name, help)| (name.as_str(), value_text(help)))
                .collect::<Vec<_>>(),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(|name| (name, String::new()))
                .collect(),
            _ => Vec::new(),
        };
        subcommands.sort_by(|a, b| a.0.cmp(b.0));
        subcommands
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
