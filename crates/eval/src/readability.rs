//! Flesch reading ease over visible prose

use crate::types::ReadabilityMetrics;

const VOWELS: &str = "aeiouyáàâãéèêíìóòôõúùüý";

/// Compute readability metrics for plain text
///
/// Syllables are approximated by vowel groups, with a silent trailing `e`
/// dropped when `silent_e` is set (English).
pub fn readability(text: &str, silent_e: bool) -> ReadabilityMetrics {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();

    let total_words = words.len();
    if total_words == 0 {
        return ReadabilityMetrics::default();
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
        .max(1);

    let syllables: usize = words.iter().map(|w| count_syllables(w, silent_e)).sum();

    let words_per_sentence = total_words as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / total_words as f64;

    let flesch = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;

    ReadabilityMetrics {
        flesch_reading_ease: flesch.clamp(0.0, 100.0),
        avg_words_per_sentence: words_per_sentence,
        total_words,
    }
}

/// Vowel-group syllable estimate, at least one per word
pub fn count_syllables(word: &str, silent_e: bool) -> usize {
    let mut count = 0;
    let mut previous_vowel = false;

    for c in word.chars() {
        let vowel = VOWELS.contains(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    if silent_e && count > 1 && word.ends_with('e') && !word.ends_with("le") {
        count -= 1;
    }

    count.max(1)
}
