//! Paragraph splitting and greedy column wrapping.
//!
//! Wrapping counts characters, not pixels: the column count comes from the
//! font's average advance, so proportional fonts may overshoot the content width.

/// Blank-line paragraph delimiter.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// Splits text on blank lines, trimming each paragraph and dropping empty ones.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(PARAGRAPH_DELIMITER)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Greedy whitespace wrap to at most `columns` characters per line.
///
/// A word joins the current line while `len(line) + 1 + len(word) <= columns`.
/// Words are never split: a word longer than `columns` gets a line of its own.
pub fn wrap_words(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= columns {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
