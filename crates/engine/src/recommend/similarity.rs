//! Trigram similarity for fuzzy error-type matching.
//!
//! Analyzer output is free text ("TypeError", "type error", "typeerrors"),
//! so exact substring checks miss near matches. The related-content scorer
//! falls back to word-level trigram similarity.

use trigram::similarity;

/// Minimum word similarity that counts as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Trigram similarity between two strings, case-insensitive (0.0 - 1.0).
pub fn compute_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    f64::from(similarity(&a.to_lowercase(), &b.to_lowercase()))
}

/// Highest similarity between `needle` and any word of `haystack`.
///
/// Words shorter than three characters are ignored.
pub fn best_word_match(needle: &str, haystack: &str) -> f64 {
    if needle.is_empty() || haystack.is_empty() {
        return 0.0;
    }

    let needle_lower = needle.to_lowercase();

    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
        .filter(|word| word.len() >= 3)
        .map(|word| f64::from(similarity(&needle_lower, &word.to_lowercase())))
        .fold(0.0, f64::max)
}

/// Whether `text` mentions `term`, exactly or fuzzily.
pub fn mentions(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let text_lower = text.to_lowercase();
    text_lower.contains(&term.to_lowercase()) || best_word_match(term, text) >= DEFAULT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert!((compute_similarity("TypeError", "typeerror") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(compute_similarity("", "x"), 0.0);
        assert_eq!(best_word_match("", "some text"), 0.0);
        assert!(!mentions("anything", ""));
    }

    #[test]
    fn test_best_word_match_picks_closest_word() {
        let score = best_word_match("recursion", "Explain recursive recursion limits");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mentions_substring_and_fuzzy() {
        assert!(mentions("How do I fix a SyntaxError here?", "syntaxerror"));
        assert!(mentions("Avoid TypeErrors when adding strings", "TypeError"));
        assert!(!mentions("Sorting a list in place", "timeout"));
    }
}
