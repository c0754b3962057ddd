use std::path::{Path, PathBuf};

use anyhow::Context;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mdbook::book::Book;
use mdbook::book::Chapter;
use mdbook::preprocess::{Preprocessor, PreprocessorContext};

use crate::cache::{MalformedOutput, OutputCache, Runner, ShellRunner};
use crate::command::{CommandOutput, DIAGNOSTIC_SEPARATOR};
use crate::directive::{find_directives, Directive, DIRECTIVE_NAME};
use crate::error::Error;
use crate::help::HelpDescriptor;
use crate::render::{render_definition_list, render_diagnostic};
use crate::utils::map_chapter;

/// `[preprocessor.command-json-output]` table of `book.toml`.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommandJsonOutputConfig {
    /// Directory commands run in, relative to the book root.
    pub working_dir: Option<PathBuf>,
    pub on_malformed_output: MalformedOutput,
    pub curly_quotes: bool,
}

impl CommandJsonOutputConfig {
    pub fn create_preprocessor(&self, root_path: PathBuf) -> CommandJsonOutput {
        CommandJsonOutput {
            working_dir: self.working_dir.as_ref().map(|dir| root_path.join(dir)),
            on_malformed_output: self.on_malformed_output,
            curly_quotes: self.curly_quotes,
            root_path,
        }
    }
}

pub struct CommandJsonOutput {
    pub root_path: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub on_malformed_output: MalformedOutput,
    pub curly_quotes: bool,
}

impl Default for CommandJsonOutput {
    fn default() -> Self {
        CommandJsonOutputConfig::default().create_preprocessor(Path::new(".").to_path_buf())
    }
}

impl Preprocessor for CommandJsonOutput {
    fn name(&self) -> &str {
        DIRECTIVE_NAME
    }

    fn supports_renderer(&self, renderer: &str) -> bool {
        renderer == "html"
    }

    fn run(&self, context: &PreprocessorContext, mut book: Book) -> Result<Book> {
        let key = format!("preprocessor.{}", self.name());
        let config = context
            .config
            .get_deserialized_opt::<CommandJsonOutputConfig, _>(&key)
            .with_context(|| format!("Could not deserialize [{}]", key))?
            .unwrap_or_default();
        let preprocessor = config.create_preprocessor(context.root.clone());

        // One cache per build, shared by every chapter.
        let mut cache = preprocessor.new_session();
        map_chapter(&mut book, &mut |chapter| {
            preprocessor.run_on_chapter(chapter, &mut cache)
        })?;
        info!(commands = cache.len(), "rendered command help");
        Ok(book)
    }
}

impl CommandJsonOutput {
    /// Starts the output cache for one book build.
    pub fn new_session(&self) -> OutputCache<ShellRunner> {
        OutputCache::new(ShellRunner {
            working_dir: self.working_dir.clone(),
            on_malformed_output: self.on_malformed_output,
        })
    }

    fn run_on_chapter<R: Runner>(
        &self,
        chapter: &mut Chapter,
        cache: &mut OutputCache<R>,
    ) -> Result<()> {
        chapter.content = self
            .run_on_content(&chapter.content, cache)
            .with_context(|| {
                format!("Failed to render command help in chapter `{}`", chapter.name)
            })?;
        Ok(())
    }

    // This method is public for regression tests
    pub fn run_on_content<R: Runner>(
        &self,
        content: &str,
        cache: &mut OutputCache<R>,
    ) -> crate::Result<String> {
        let directives = find_directives(content)?;
        if directives.is_empty() {
            return Ok(content.to_string());
        }

        let mut result = String::with_capacity(content.len());
        let mut last = 0;
        for directive in &directives {
            result.push_str(&content[last..directive.range.start]);
            result.push_str(&self.render_directive(directive, cache)?);
            last = directive.range.end;
        }
        result.push_str(&content[last..]);
        Ok(result)
    }

    fn render_directive<R: Runner>(
        &self,
        directive: &Directive,
        cache: &mut OutputCache<R>,
    ) -> crate::Result<String> {
        debug!(
            command = %directive.command,
            line = directive.line,
            level = directive.level,
            "expanding directive"
        );
        let value = match cache.lookup(&directive.command)? {
            CommandOutput::Diagnostic(text) => {
                warn!(command = %directive.command, "command failed, rendering its output");
                return Ok(render_diagnostic(text));
            }
            CommandOutput::Json(value) => value,
        };

        match (HelpDescriptor::from_value(value), self.on_malformed_output) {
            (Ok(help), _) => Ok(render_definition_list(&help, self.curly_quotes)),
            (Err(source), MalformedOutput::Inline) => {
                warn!(command = %directive.command, error = %source, "not a help descriptor");
                Ok(render_diagnostic(&format!(
                    "{}{}{}",
                    directive.command, DIAGNOSTIC_SEPARATOR, source
                )))
            }
            (Err(source), MalformedOutput::Fail) => Err(Error::Schema {
                command: directive.command.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use crate::command::Command;

    use super::*;

    #[test]
    pub fn test_deserialize_config() {
        let expected = CommandJsonOutputConfig {
            working_dir: Some("tools".into()),
            on_malformed_output: MalformedOutput::Inline,
            curly_quotes: true,
        };
        let toml_config = r#"
        working-dir = "tools"
        on-malformed-output = "inline"
        curly-quotes = true
        "#;
        let config: CommandJsonOutputConfig = toml::from_str(toml_config).unwrap();
        assert_eq!(config, expected);
    }

    #[test]
    pub fn test_empty_config() {
        let config: CommandJsonOutputConfig = toml::from_str("").unwrap();
        assert_eq!(config, CommandJsonOutputConfig::default());
    }

    #[test]
    pub fn test_working_dir_relative_to_root() {
        let config = CommandJsonOutputConfig {
            working_dir: Some("tools".into()),
            ..Default::default()
        };
        let preprocessor = config.create_preprocessor(PathBuf::from("/book"));
        assert_eq!(preprocessor.working_dir, Some(PathBuf::from("/book/tools")));
    }

    struct StubRunner {
        output: CommandOutput,
        calls: Cell<usize>,
    }

    impl StubRunner {
        fn new(output: CommandOutput) -> Self {
            Self {
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl Runner for StubRunner {
        fn run(&self, _command: &Command) -> crate::Result<CommandOutput> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.clone())
        }
    }

    #[test]
    pub fn test_run_on_content() {
        let runner = StubRunner::new(CommandOutput::Json(json!({
            "groups": [{
                "title": "Options",
                "actions": [{ "option_strings": ["--foo"], "help": "Enable foo" }]
            }]
        })));
        let mut cache = OutputCache::new(runner);
        let content = "# Tool\n\n<!-- command-json-output tool --help-json -->\n\nEnd\n";

        let result = CommandJsonOutput::default()
            .run_on_content(content, &mut cache)
            .unwrap();

        assert_eq!(
            result,
            "# Tool\n\n<div class=\"cli-group-title\">Options</div>\
             <dl class=\"dl-horizontal dl-multiline docutils\">\
             <dt>--foo</dt><dd>Enable foo</dd></dl>\n\nEnd\n"
        );
    }

    #[test]
    pub fn test_shared_command_runs_once() {
        let mut cache = OutputCache::new(StubRunner::new(CommandOutput::Json(json!({
            "groups": []
        }))));
        let preprocessor = CommandJsonOutput::default();
        let chapter = "<!-- command-json-output tool -->\n<!-- command-json-output  tool  -->\n";

        preprocessor.run_on_content(chapter, &mut cache).unwrap();
        preprocessor.run_on_content(chapter, &mut cache).unwrap();

        assert_eq!(cache.len(), 1);
    }

    #[test]
    pub fn test_content_without_directives() {
        let mut cache = OutputCache::new(StubRunner::new(CommandOutput::Diagnostic(
            String::new(),
        )));
        let content = "# Nothing\n\n<!-- a comment -->\n";
        let result = CommandJsonOutput::default()
            .run_on_content(content, &mut cache)
            .unwrap();
        assert_eq!(result, content);
        assert!(cache.is_empty());
    }

    #[test]
    pub fn test_diagnostic_rendered_inline() {
        let mut cache = OutputCache::new(StubRunner::new(CommandOutput::Diagnostic(
            "tool : tool: not found".into(),
        )));
        let result = CommandJsonOutput::default()
            .run_on_content("<!-- command-json-output tool -->", &mut cache)
            .unwrap();
        assert_eq!(
            result,
            "<pre class=\"command-json-output-error\">tool : tool: not found</pre>"
        );
    }

    #[test]
    pub fn test_wrong_shape_fails_by_default() {
        let mut cache = OutputCache::new(StubRunner::new(CommandOutput::Json(json!({
            "sections": []
        }))));
        let err = CommandJsonOutput::default()
            .run_on_content("<!-- command-json-output tool -->", &mut cache)
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    pub fn test_wrong_shape_inline() {
        let mut cache = OutputCache::new(StubRunner::new(CommandOutput::Json(json!({
            "sections": []
        }))));
        let preprocessor = CommandJsonOutputConfig {
            on_malformed_output: MalformedOutput::Inline,
            ..Default::default()
        }
        .create_preprocessor(PathBuf::from("."));
        let result = preprocessor
            .run_on_content("<!-- command-json-output tool -->", &mut cache)
            .unwrap();
        assert!(result
            .starts_with("<pre class=\"command-json-output-error\">tool : missing field"));
    }
}
