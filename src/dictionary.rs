//! Static word list used by the spell matcher.
//!
//! Words keep their load order because the matcher's scan is order
//! sensitive; the hash set only backs membership tests.

use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Dictionary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Dictionary::default();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            if dictionary.index.insert(word.clone()) {
                dictionary.words.push(word);
            }
        }
        dictionary
    }

    /// Parses a newline-separated word list.
    pub fn from_word_list(content: &str) -> Self {
        Self::from_words(content.lines())
    }

    pub fn from_word_list_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        Ok(Self::from_word_list(&content))
    }

    /// Async load for callers running on the event loop.
    pub async fn load(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let content = tokio::fs::read_to_string(file_path).await?;
        let dictionary = Self::from_word_list(&content);
        log::info!(
            "Loaded {} dictionary words from {}",
            dictionary.len(),
            file_path.display()
        );
        Ok(dictionary)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    /// Words in load order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_list_normalisation() {
        let dictionary = Dictionary::from_word_list("Apple\n\n  banana \napple\ncherry\n");
        let words: Vec<&str> = dictionary.iter().collect();
        assert_eq!(words, vec!["apple", "banana", "cherry"]);
        assert!(dictionary.contains("banana"));
        assert!(!dictionary.contains("Apple"));
    }

    #[test]
    fn test_empty_word_list() {
        let dictionary = Dictionary::from_word_list("\n \n");
        assert!(dictionary.is_empty());
    }

    #[tokio::test]
    async fn test_async_load_missing_file() {
        assert!(Dictionary::load("/nonexistent/words.txt").await.is_err());
    }
}
