//! Shared utility functions.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of a longer text (for logs and error messages)
///
/// Collapses whitespace and appends `...` when the text was cut.
pub fn excerpt(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_char_boundary() {
        let s = "p≤0.05";
        // '≤' is 3 bytes starting at byte 1
        assert_eq!(truncate_str(s, 2), "p");
        assert_eq!(truncate_str(s, 4), "p≤");
        assert_eq!(truncate_str(s, 100), s);
    }

    #[test]
    fn test_excerpt_collapses_whitespace() {
        assert_eq!(excerpt("a  total\nof   531", 100), "a total of 531");
    }

    #[test]
    fn test_excerpt_marks_cut() {
        assert_eq!(excerpt("randomized controlled trial", 10), "randomized...");
    }
}
