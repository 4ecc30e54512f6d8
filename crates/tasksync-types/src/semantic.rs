//! Semantic text used as embedding input for a task.

use std::sync::OnceLock;

use regex::Regex;

use crate::task::TaskRecord;

fn markup_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^<]+?>").expect("static tag pattern is valid"))
}

/// Remove `<...>` markup tags by pattern match.
pub fn strip_markup(text: &str) -> String {
    markup_tag().replace_all(text, "").into_owned()
}

/// Build the normalized text blob embedded for a task.
///
/// Concatenates the title, the description without markup, and the
/// priority/status labels. Absent fields render as empty strings.
pub fn build_semantic_text(task: &TaskRecord) -> String {
    let description = strip_markup(task.description.as_deref().unwrap_or_default());

    format!(
        "Task title: {}\nDescription: {}\nPriority: {}\nStatus: {}",
        task.title.as_deref().unwrap_or_default(),
        description,
        task.priority_label().unwrap_or_default(),
        task.status_label().unwrap_or_default(),
    )
    .trim()
    .to_string()
}
