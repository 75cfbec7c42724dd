//! Post-body templating.
//!
//! Templates use `%title%`, `%link%`, and `%description%` placeholders,
//! with `%%` as a literal percent escape. Unknown placeholders render as
//! the empty string, and the final body is trimmed.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::entry::Entry;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(%%)|%(\w+)%").unwrap())
}

/// Render the post body for `entry` against `template`.
pub fn render(template: &str, entry: &Entry) -> String {
    let rendered = placeholder_re().replace_all(template, |caps: &Captures| {
        if caps.get(1).is_some() {
            return "%".to_string();
        }
        match &caps[2] {
            "title" => entry.title.clone(),
            "link" => entry.link.clone(),
            "description" => entry.comment.clone(),
            _ => String::new(),
        }
    });
    rendered.trim().to_string()
}
