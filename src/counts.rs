//! src/counts.rs
use std::collections::HashMap;
use std::collections::hash_map::Iter;

/// Word to occurrence count.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WordCounts {
    counts: HashMap<String, u64>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, word: &str) {
        // Only allocate the key the first time a word shows up.
        match self.counts.get_mut(word) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(word.to_owned(), 1);
            }
        }
    }

    /// Adds every entry of `other` into `self`, consuming it.
    pub fn merge(&mut self, other: WordCounts) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (word, count) in other.counts {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of words counted, duplicates included.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, u64> {
        self.counts.iter()
    }
}

impl<'a> IntoIterator for &'a WordCounts {
    type Item = (&'a String, &'a u64);
    type IntoIter = Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for WordCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = WordCounts::new();
        for (word, count) in iter {
            *counts.counts.entry(word.into()).or_insert(0) += count;
        }
        counts
    }
}
