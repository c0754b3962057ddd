use mdbook::utils::render_markdown;

use crate::help::{Action, Group, HelpDescriptor};
use crate::utils::string::escape_html;

const GROUP_TITLE_CLASS: &str = "cli-group-title";
const LIST_CLASS: &str = "dl-horizontal dl-multiline docutils";
const DIAGNOSTIC_CLASS: &str = "command-json-output-error";

/// Renders a help descriptor as a sequence of titled HTML definition lists.
///
/// Titles, option strings and help texts are inserted as they are, group
/// descriptions go through the markdown renderer.
pub fn render_definition_list(help: &HelpDescriptor, curly_quotes: bool) -> String {
    let mut html = String::new();
    for group in &help.groups {
        render_group(&mut html, group, curly_quotes);
    }
    html
}

fn render_group(html: &mut String, group: &Group, curly_quotes: bool) {
    if let Some(title) = group.title.as_deref().filter(|t| !t.is_empty()) {
        html.push_str(&format!("<div class=\"{}\">{}", GROUP_TITLE_CLASS, title));
        if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
            html.push_str("<p>");
            html.push_str(&render_markdown(description, curly_quotes));
            html.push_str("</p>");
        }
        html.push_str("</div>");
    }

    html.push_str(&format!("<dl class=\"{}\">", LIST_CLASS));
    for action in &group.actions {
        render_action(html, action);
    }
    html.push_str("</dl>");
}

fn render_action(html: &mut String, action: &Action) {
    let help = action.help.as_deref().unwrap_or_default();
    if !action.option_strings.is_empty() || !help.is_empty() {
        push_definition(html, &action.option_strings.join(" / "), help);
    }

    for (name, description) in action.subcommands() {
        push_definition(html, name, &description);
    }
}

fn push_definition(html: &mut String, term: &str, definition: &str) {
    html.push_str("<dt>");
    html.push_str(term);
    html.push_str("</dt><dd>");
    html.push_str(definition);
    html.push_str("</dd>");
}

/// Renders the text left by a failed command so it shows up in the page.
pub fn render_diagnostic(text: &str) -> String {
    format!(
        "<pre class=\"{}\">{}</pre>",
        DIAGNOSTIC_CLASS,
        escape_html(text.trim_end())
    )
}
