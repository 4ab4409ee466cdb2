//! src/top.rs
use crate::counts::WordCounts;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopEntry<'a> {
    pub word: &'a str,
    pub count: u64,
}

/// The `n` most frequent words, highest count first. Equal counts are
/// ordered alphabetically so the result does not depend on hash order.
pub fn top_words(counts: &WordCounts, n: usize) -> Vec<TopEntry<'_>> {
    if n == 0 {
        return vec![];
    }
    let mut entries: Vec<TopEntry<'_>> = counts
        .iter()
        .map(|(word, &count)| TopEntry { word, count })
        .collect();
    entries.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(b.word)));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, count: u64) -> TopEntry<'_> {
        TopEntry { word, count }
    }

    #[test]
    fn should_order_by_count_descending() {
        let counts = WordCounts::from_iter([("a", 1), ("b", 5), ("c", 3)]);
        assert_eq!(
            top_words(&counts, 2),
            vec![entry("b", 5), entry("c", 3)]
        );
    }

    #[test]
    fn should_break_ties_alphabetically() {
        let counts = WordCounts::from_iter([("pear", 2), ("apple", 2), ("fig", 2), ("kiwi", 9)]);
        assert_eq!(
            top_words(&counts, 3),
            vec![entry("kiwi", 9), entry("apple", 2), entry("fig", 2)]
        );
    }

    #[test]
    fn should_return_nothing_for_zero() {
        let counts = WordCounts::from_iter([("a", 1)]);
        assert!(top_words(&counts, 0).is_empty());
    }

    #[test]
    fn should_return_the_whole_map_when_n_exceeds_it() {
        let counts = WordCounts::from_iter([("x", 1), ("y", 4)]);
        assert_eq!(
            top_words(&counts, DEFAULT_TOP_N),
            vec![entry("y", 4), entry("x", 1)]
        );
    }

    #[test]
    fn should_be_idempotent() {
        let counts = WordCounts::from_iter((0..50).map(|i| (format!("w{i}"), i % 7)));
        assert_eq!(top_words(&counts, 10), top_words(&counts, 10));
    }

    #[test]
    fn should_handle_an_empty_map() {
        assert!(top_words(&WordCounts::new(), 10).is_empty());
    }
}
