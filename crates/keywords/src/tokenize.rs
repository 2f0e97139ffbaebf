use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Minimum keyword length, in characters.
pub const DEFAULT_MIN_LENGTH: usize = 3;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "been", "be", "have", "has", "had", "do", "does", "did",
        "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
        "these", "those", "i", "you", "he", "she", "it", "we", "they", "them", "their", "what",
        "which", "who", "when", "where", "why", "how", "all", "each", "every", "both", "few",
        "more", "most", "other", "some", "such", "no", "not", "only", "own", "same", "so",
        "than", "too", "very", "s", "t", "just", "now", "my", "your", "our", "like", "get",
        "got", "new", "out", "up", "down", "over", "after", "before", "into", "through",
        "during",
    ]
    .into_iter()
    .collect()
});

#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Lowercased keywords of at least `min_length` characters, in text order.
///
/// Anything that is not a letter, digit, underscore or whitespace separates words, so
/// `"don't"` yields `"don"` and `"t"`.
#[must_use]
pub fn extract_keywords(text: &str, min_length: usize) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .filter(|word| word.chars().count() >= min_length && !is_stop_word(word))
        .map(str::to_string)
        .collect()
}
