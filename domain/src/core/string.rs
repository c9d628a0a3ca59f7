//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// `max_len` counts bytes; the cut backs off to the previous character
/// boundary.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate("vote 3", 10), "vote 3");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("the wolves strike again", 12), "the wolve...");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; a cut at byte 2 would split it
        assert_eq!(truncate("aéééé", 5), "a...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  I  suspect\n\nplayer 4 "), "I suspect player 4");
    }
}
