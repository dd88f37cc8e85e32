//! Heading text normalization.

/// Characters stripped from both ends of heading text.
const EDGE_PUNCTUATION: &[char] = &[' ', '.', ',', ';', ':'];

/// Collapse whitespace runs to single spaces and strip surrounding
/// spaces and `. , ; :` punctuation.
pub fn normalize_heading(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(EDGE_PUNCTUATION).to_string()
}

/// Number of characters (not bytes) in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Check that a character count falls within `[min, max]`.
pub fn len_within(text: &str, min: usize, max: usize) -> bool {
    let len = char_len(text);
    len >= min && len <= max
}
