//! src/counter.rs
use crate::counts::WordCounts;
use crate::error::error_chain_fmt;
use crate::tokenizer::Tokenizer;
use std::num::NonZeroUsize;
use std::thread;

#[derive(thiserror::Error)]
pub enum CountError {
    #[error("Failed to start counting worker {index}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Counting worker {index} panicked")]
    WorkerPanicked { index: usize },
}

impl std::fmt::Debug for CountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

/// What a fan-out worker runs on its file.
pub trait CountWords {
    fn count_words(&self, text: &str) -> Result<WordCounts, CountError>;
}

/// Counts word frequencies either in one pass or across a fixed number of
/// worker threads.
#[derive(Debug, Clone, Copy)]
pub struct WordCounter {
    workers: NonZeroUsize,
}

impl WordCounter {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    pub fn count(&self, text: &str) -> WordCounts {
        count_partition(text)
    }

    /// Scans `workers` partitions of `text` on their own threads and merges
    /// the per-thread maps once every thread has finished.
    ///
    /// Workers share nothing while scanning. Their maps come back through the
    /// join handles and are merged here in partition order, so no lock is
    /// involved.
    #[tracing::instrument(
        name = "Count words in parallel",
        skip_all,
        fields(bytes = text.len(), workers = self.workers.get())
    )]
    pub fn count_parallel(&self, text: &str) -> Result<WordCounts, CountError> {
        let partitions = partition(text, self.workers);

        thread::scope(|scope| -> Result<WordCounts, CountError> {
            let mut handles = Vec::with_capacity(partitions.len());
            for (index, part) in partitions.into_iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("count-{index}"))
                    .spawn_scoped(scope, move || count_partition(part))
                    .map_err(|source| CountError::Spawn { index, source })?;
                handles.push(handle);
            }

            // Join everything before looking at results: an unjoined panicked
            // thread would make the scope itself panic.
            let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();

            let mut merged = WordCounts::new();
            for (index, local) in joined.into_iter().enumerate() {
                let local = local.map_err(|_| CountError::WorkerPanicked { index })?;
                merged.merge(local);
            }
            tracing::debug!(distinct = merged.distinct(), "Merged worker results");
            Ok(merged)
        })
    }
}

impl CountWords for WordCounter {
    fn count_words(&self, text: &str) -> Result<WordCounts, CountError> {
        self.count_parallel(text)
    }
}

fn count_partition(text: &str) -> WordCounts {
    let mut counts = WordCounts::new();
    Tokenizer::new().scan(text, |word| counts.record(word));
    counts
}

/// Splits `text` into exactly `parts` contiguous slices that together cover
/// it.
///
/// Boundary `i` starts at `i * (len / parts)` and moves forward until it sits
/// on a char boundary that is not inside a word. The last slice takes
/// whatever is left, including the division remainder. Slices may be empty.
pub fn partition(text: &str, parts: NonZeroUsize) -> Vec<&str> {
    let parts = parts.get();
    let step = text.len() / parts;

    let mut slices = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 1..parts {
        let end = word_boundary_from(text, (i * step).max(start));
        slices.push(&text[start..end]);
        start = end;
    }
    slices.push(&text[start..]);
    slices
}

fn word_boundary_from(text: &str, mut pos: usize) -> usize {
    while !text.is_char_boundary(pos) {
        pos += 1;
    }

    let inside_word = text[..pos]
        .chars()
        .next_back()
        .is_some_and(char::is_alphabetic);
    if !inside_word {
        return pos;
    }

    match text[pos..].char_indices().find(|&(_, c)| !c.is_alphabetic()) {
        Some((offset, _)) => pos + offset,
        None => text.len(),
    }
}
