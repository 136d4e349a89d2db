//! Text helpers shared by the table printer and the TUI.

/// Shorten to `max` characters, ending in "…" when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    match max {
        0 => String::new(),
        1 => s.chars().take(1).collect(),
        _ => {
            let mut cut: String = s.chars().take(max - 1).collect();
            cut.push('…');
            cut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 10), "this is t…");
        assert_eq!(truncate("abc", 1), "a");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("héllo wörld", 5), "héll…");
        assert_eq!(truncate("日本語テキスト", 4), "日本語…");
    }
}
