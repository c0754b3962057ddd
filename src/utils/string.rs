use std::borrow::Cow;

// Programs run through `cmd` print CRLF line breaks, diagnostics use LF only.
pub fn normalize_newlines(str: Cow<'_, str>) -> String {
    str.replace("\r\n", "\n")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
