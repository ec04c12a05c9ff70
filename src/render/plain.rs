use crate::stat::StatEntry;

/// Plain-text body: entry names joined with newlines, trailing newline.
pub fn render(entries: &[StatEntry]) -> String {
    let mut body = String::new();
    for entry in entries {
        body.push_str(&entry.name);
        body.push('\n');
    }
    if entries.is_empty() {
        body.push('\n');
    }
    body
}
