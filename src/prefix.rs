use std::ops::Range;

/// Byte range of the trailing run of ASCII letters, if the text ends in one.
pub fn trailing_token_range(text: &str) -> Option<Range<usize>> {
    let end = text.len();
    let start = text
        .bytes()
        .rposition(|b| !b.is_ascii_alphabetic())
        .map_or(0, |idx| idx + 1);
    if start == end { None } else { Some(start..end) }
}

/// The token under edit, lowercased. Empty when the text ends in anything
/// other than an ASCII letter.
pub fn extract_token(text: &str) -> String {
    trailing_token_range(text)
        .map(|range| text[range].to_ascii_lowercase())
        .unwrap_or_default()
}
