//! src/tokenizer.rs

/// Splits text into lowercase words made of alphabetic characters.
///
/// Anything that is not `char::is_alphabetic` separates words: digits,
/// punctuation and whitespace never end up inside a word. The word buffer is
/// reused between emissions, so scanning a large buffer allocates only when a
/// caller keeps a word.
#[derive(Debug, Default)]
pub struct Tokenizer {
    word: String,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `emit` once per word in `text`, in order of appearance.
    pub fn scan<F: FnMut(&str)>(&mut self, text: &str, mut emit: F) {
        self.word.clear();
        for c in text.chars() {
            if c.is_alphabetic() {
                self.word.extend(c.to_lowercase());
            } else if !self.word.is_empty() {
                emit(&self.word);
                self.word.clear();
            }
        }
        if !self.word.is_empty() {
            emit(&self.word);
            self.word.clear();
        }
    }
}

pub fn words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    Tokenizer::new().scan(text, |word| out.push(word.to_owned()));
    out
}
