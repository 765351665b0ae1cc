use rayon::prelude::*;
use std::path::Path;

use crate::dictionary::Dictionary;
use crate::error::Result;

pub const DEFAULT_SUGGESTIONS: usize = 3;
const MIN_CANDIDATE_LEN: usize = 3;

/// Single-pass alignment check: true when exactly one substitution,
/// insertion or deletion separates `a` and `b`.
pub fn is_edit_distance_one(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > 1 {
        return false;
    }

    let (mut i, mut j, mut diff) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            i += 1;
            j += 1;
            continue;
        }
        diff += 1;
        if diff > 1 {
            return false;
        }
        if a.len() > b.len() {
            i += 1;
        } else if b.len() > a.len() {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }
    // a leftover character on the longer side is the insertion
    if i < a.len() || j < b.len() {
        diff += 1;
    }
    diff == 1
}

// lengths are counted in chars so the filter agrees with the alignment
fn is_candidate(word: &str, candidate: &str) -> bool {
    let candidate_len = candidate.chars().count();
    candidate_len >= MIN_CANDIDATE_LEN
        && word.chars().next() == candidate.chars().next()
        && word.chars().count().abs_diff(candidate_len) <= 1
        && is_edit_distance_one(word, candidate)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestedCorrection {
    /// The word is already in the dictionary.
    NoSuggestions,
    Suggestions(Vec<String>),
}

impl SuggestedCorrection {
    pub fn into_words(self) -> Vec<String> {
        match self {
            SuggestedCorrection::NoSuggestions => Vec::new(),
            SuggestedCorrection::Suggestions(words) => words,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpellCorrector {
    dictionary: Dictionary,
}

impl SpellCorrector {
    pub fn new(dictionary: Dictionary) -> Self {
        SpellCorrector { dictionary }
    }

    pub fn from_word_list_file(file_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Dictionary::from_word_list_file(file_path)?))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.dictionary.contains(word)
    }

    /// First `n_suggestions` dictionary words, in load order, one edit away
    /// from `word`. Not a best-match search: the scan stops early.
    pub fn suggest(&self, word: &str, n_suggestions: usize) -> Vec<String> {
        self.dictionary
            .iter()
            .filter(|candidate| is_candidate(word, candidate))
            .take(n_suggestions)
            .map(str::to_owned)
            .collect()
    }

    pub fn suggest_single_word_corrections(
        &self,
        word: &str,
        n_suggestions: usize,
    ) -> SuggestedCorrection {
        let word = word.to_lowercase();
        if self.dictionary.contains(&word) {
            return SuggestedCorrection::NoSuggestions;
        }
        SuggestedCorrection::Suggestions(self.suggest(&word, n_suggestions))
    }

    pub fn suggest_word_corrections(
        &self,
        words: &[String],
        n_suggestions: usize,
    ) -> Vec<SuggestedCorrection> {
        words
            .par_iter()
            .map(|word| self.suggest_single_word_corrections(word, n_suggestions))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn corrector(words: &[&str]) -> SpellCorrector {
        SpellCorrector::new(Dictionary::from_words(words))
    }

    #[test]
    fn test_edit_distance_one_substitution() {
        assert!(is_edit_distance_one("word", "wore"));
        assert!(is_edit_distance_one("cat", "cut"));
        assert!(!is_edit_distance_one("cat", "dog"));
    }

    #[test]
    fn test_edit_distance_one_insertion() {
        assert!(is_edit_distance_one("worl", "world"));
        assert!(is_edit_distance_one("world", "wold"));
        assert!(is_edit_distance_one("spelling", "speling"));
        assert!(!is_edit_distance_one("ab", "abcd"));
    }

    #[test]
    fn test_edit_distance_one_rejects_identical_and_transposed() {
        assert!(!is_edit_distance_one("same", "same"));
        assert!(!is_edit_distance_one("wrold", "world"));
    }

    #[test]
    fn test_suggest_pins_fixture() {
        let corrector = corrector(&["world", "word", "wold"]);
        assert_eq!(corrector.suggest("wrold", 3), vec!["wold"]);
        assert_eq!(corrector.suggest("worl", 3), vec!["world", "word"]);
    }

    #[test]
    fn test_suggest_requires_first_letter_and_length() {
        let corrector = corrector(&["bat", "at", "cart", "ca", "cast"]);
        // "bat" differs in the first letter, "ca" is too short
        assert_eq!(corrector.suggest("cat", 5), vec!["cart", "cast"]);
    }

    #[test]
    fn test_suggest_counts_chars_not_bytes() {
        let corrector = corrector(&["café", "éé"]);
        assert_eq!(corrector.suggest("caf", 3), vec!["café"]);
        // two chars is still too short, whatever the byte length
        assert!(corrector.suggest("é", 3).is_empty());
    }

    #[test]
    fn test_suggest_stops_at_limit_in_load_order() {
        let corrector = corrector(&["hats", "hat", "halt", "heat", "hate"]);
        assert_eq!(corrector.suggest("hat", 10), vec!["hats", "halt", "heat", "hate"]);
        assert_eq!(corrector.suggest("hatt", 2), vec!["hats", "hat"]);
    }

    #[test]
    fn test_known_word_has_no_suggestions() {
        let corrector = corrector(&["spelling", "corrected"]);
        assert_eq!(
            corrector.suggest_single_word_corrections("Spelling", 3),
            SuggestedCorrection::NoSuggestions
        );
        assert_eq!(
            corrector.suggest_single_word_corrections("speling", 3),
            SuggestedCorrection::Suggestions(vec!["spelling".to_string()])
        );
    }

    #[test]
    fn test_batch_corrections_keep_input_order() {
        let corrector = corrector(&["spelling", "checker"]);
        let words: Vec<String> = ["checkr", "spelling", "zzz"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = corrector.suggest_word_corrections(&words, 3);
        assert_eq!(
            results,
            vec![
                SuggestedCorrection::Suggestions(vec!["checker".to_string()]),
                SuggestedCorrection::NoSuggestions,
                SuggestedCorrection::Suggestions(Vec::new()),
            ]
        );
    }

    proptest! {
        #[test]
        fn edit_distance_one_is_symmetric(a in "[a-e]{0,6}", b in "[a-e]{0,6}") {
            prop_assert_eq!(is_edit_distance_one(&a, &b), is_edit_distance_one(&b, &a));
        }

        #[test]
        fn single_substitution_is_distance_one(word in "[a-z]{1,8}", idx in 0usize..8) {
            let idx = idx % word.len();
            let mut chars: Vec<char> = word.chars().collect();
            chars[idx] = if chars[idx] == 'z' { 'a' } else { 'z' };
            let changed: String = chars.into_iter().collect();
            prop_assert!(is_edit_distance_one(&word, &changed));
        }
    }
}
