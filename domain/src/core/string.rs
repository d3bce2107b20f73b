//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries. Used to fit long table cells in console output.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("Power Rating", 20), "Power Rating");
        assert_eq!(truncate("Phase Configuration", 8), "Phase...");
    }

    #[test]
    fn test_truncate_pricing_marker() {
        // "✅" is 3 bytes; the cut must not land inside it
        assert_eq!(truncate("✅ Yes", 20), "✅ Yes");
        assert_eq!(truncate("✅✅✅✅", 7), "✅...");
    }
}
