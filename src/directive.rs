use std::ops::Range;

use lazy_static::lazy_static;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;

use crate::command::Command;
use crate::error::{Error, Result};

pub const DIRECTIVE_NAME: &str = "command-json-output";

pub const DEFAULT_LEVEL: u32 = 1;

lazy_static! {
    static ref DIRECTIVE_REG: Regex = Regex::new(
        r"<!--[ ]*command-json-output(?:[ ]+:level:[ ]*(\S*))?[ ]+(.*?)-->"
    )
    .expect("Failed to init regex for finding command-json-output directives");
}

/// One `<!-- command-json-output ... -->` comment found in a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub command: Command,
    /// Heading level requested with `:level:`. Kept for the page but not used
    /// when rendering.
    pub level: u32,
    /// 1-based line the directive starts on.
    pub line: usize,
    /// Byte range of the whole comment in the chapter.
    pub range: Range<usize>,
}

// Byte ranges of code blocks and code spans, whose text is shown as written.
fn code_ranges(content: &str) -> Vec<Range<usize>> {
    Parser::new(content)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// Finds the directives of a chapter, leaving out the ones quoted in code.
pub fn find_directives(content: &str) -> Result<Vec<Directive>> {
    let code = code_ranges(content);
    let mut directives = Vec::new();
    for caps in DIRECTIVE_REG.captures_iter(content) {
        let (Some(whole), Some(argument)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if code.iter().any(|range| range.contains(&whole.start())) {
            continue;
        }
        let line = content[..whole.start()].matches('\n').count() + 1;

        let level = match caps.get(1) {
            None => DEFAULT_LEVEL,
            Some(level) => level.as_str().parse().map_err(|_| Error::Directive {
                line,
                message: format!("`{}` is not a non-negative integer level", level.as_str()),
            })?,
        };

        let command = Command::new(argument.as_str());
        if command.line().is_empty() {
            return Err(Error::Directive {
                line,
                message: "missing command".to_string(),
            });
        }

        directives.push(Directive {
            command,
            level,
            line,
            range: whole.range(),
        });
    }
    Ok(directives)
}
