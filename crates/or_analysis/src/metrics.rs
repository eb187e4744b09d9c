pub use or_core::domain_of;

/// Whitespace-separated tokens; empty and blank text count as zero.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn character_count(text: &str) -> usize {
    text.chars().count()
}

/// Non-empty segments between `.`, `!` and `?`.
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Flesch reading ease with characters standing in for syllables:
/// `206.835 - 1.015 * (words / sentences) - 84.6 * (characters / words)`.
/// `characters` is the same raw `character_count` reported on the analysis,
/// so the score can be recomputed from the published counts.
/// Zero when the text has no words or no sentences.
pub fn readability_score(text: &str) -> f64 {
    let words = word_count(text);
    let sentences = sentence_count(text);
    if words == 0 || sentences == 0 {
        return 0.0;
    }
    let words = words as f64;
    let sentences = sentences as f64;
    let characters = character_count(text) as f64;
    206.835 - 1.015 * (words / sentences) - 84.6 * (characters / words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_blank_is_zero() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("worms  eat\nscraps"), 3);
    }

    #[test]
    fn test_character_count_is_chars() {
        assert_eq!(character_count("abc"), 3);
        assert_eq!(character_count("café"), 4);
    }

    #[test]
    fn test_sentences() {
        assert_eq!(sentence_count("One. Two! Three? "), 3);
        assert_eq!(sentence_count("...!!"), 0);
        assert_eq!(sentence_count("no terminator"), 1);
    }

    #[test]
    fn test_readability_zero_cases() {
        assert_eq!(readability_score(""), 0.0);
        assert_eq!(readability_score("   "), 0.0);
        assert_eq!(readability_score("?!."), 0.0);
    }

    #[test]
    fn test_readability_formula() {
        // 4 words, 2 sentences, 22 chars
        let text = "Worms eat. Scraps rot.";
        assert_eq!(character_count(text), 22);
        let expected = 206.835 - 1.015 * (4.0 / 2.0) - 84.6 * (22.0 / 4.0);
        assert!((readability_score(text) - expected).abs() < 1e-9);
        assert_eq!(readability_score(text), readability_score(text));
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://WWW.Example.com/a").as_deref(), Some("example.com"));
        assert_eq!(domain_of("not a url"), None);
    }
}
