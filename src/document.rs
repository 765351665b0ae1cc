use crate::prefix::trailing_token_range;

/// The editable text buffer. Edits always land at the end of the text and
/// leave the cursor there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Document { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the edit cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.cursor = self.text.len();
    }

    pub fn backspace(&mut self) -> Option<char> {
        let removed = self.text.pop();
        self.cursor = self.text.len();
        removed
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    /// Replaces the trailing token (if any) with `word` and a single space.
    pub fn replace_trailing_token(&mut self, word: &str) {
        if let Some(range) = trailing_token_range(&self.text) {
            self.text.truncate(range.start);
        }
        self.text.push_str(word);
        self.text.push(' ');
        self.cursor = self.text.len();
    }
}
