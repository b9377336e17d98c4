//! Text filters applied to every candidate post before it is kept.

use whatlang::Lang;

/// Posts longer than this are skipped; short posts classify more reliably.
pub const MAX_POST_CHARS: usize = 500;

pub fn is_too_long(text: &str) -> bool {
    text.chars().count() > MAX_POST_CHARS
}

/// At least two alphabetic words after stripping URLs and punctuation.
/// Weeds out link-only posts, emoji walls, and single-word replies.
pub fn is_valid_text(text: &str) -> bool {
    let strip_re = regex::Regex::new(r"(?i)http\S+|\n|[^\w\s]").expect("valid regex");
    let word_re = regex::Regex::new(r"(?i)\b[a-z]+\b").expect("valid regex");

    let cleaned = strip_re.replace_all(text, " ");
    word_re.find_iter(&cleaned).count() > 1
}

/// Language detection is unreliable below a few characters, so very short
/// text is rejected outright rather than guessed at.
pub fn is_english(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < 3 {
        return false;
    }
    whatlang::detect_lang(trimmed) == Some(Lang::Eng)
}

/// Whole-word, case-insensitive keyword match.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
    let keyword_re = regex::Regex::new(&pattern).expect("valid regex");
    keyword_re.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_text_needs_more_than_one_word() {
        assert!(is_valid_text("two words"));
        assert!(!is_valid_text("single"));
        assert!(!is_valid_text(""));
    }

    #[test]
    fn valid_text_ignores_urls_and_punctuation() {
        assert!(!is_valid_text("https://example.com/a https://example.com/b"));
        assert!(!is_valid_text("!!! ??? ..."));
        assert!(is_valid_text("check this https://example.com out now"));
    }

    #[test]
    fn too_long_counts_characters() {
        assert!(!is_too_long(&"a".repeat(500)));
        assert!(is_too_long(&"a".repeat(501)));
    }

    #[test]
    fn english_detection_with_short_guard() {
        assert!(!is_english(""));
        assert!(!is_english("ab"));
        assert!(is_english(
            "I watched the new episode last night and honestly the writing was \
             much sharper than I expected it to be."
        ));
        assert!(!is_english(
            "El tiempo estaba muy agradable ayer por la tarde cuando salimos a caminar por el parque."
        ));
    }

    #[test]
    fn keyword_match_is_whole_word() {
        assert!(contains_keyword("that look will slay tonight", "slay"));
        assert!(contains_keyword("Slay, honestly", "slay"));
        assert!(!contains_keyword("the slayer arrived", "slay"));
    }
}
