// Output: CSV tables, the LDAvis bundle, terminal display and the markdown report.

pub mod ldavis;
pub mod markdown;
pub mod tables;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so topic labels built from accented
/// or non-Latin terms never panic when shortened for a table column.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
