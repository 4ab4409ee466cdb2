//! tests/api/counting.rs
use crate::helpers::test_data_dir;
use claims::assert_ok;
use std::num::NonZeroUsize;
use wordbench::counter::WordCounter;
use wordbench::input::read_text;
use wordbench::top::{DEFAULT_TOP_N, top_words};

#[test]
fn should_agree_on_real_prose_for_every_worker_count() {
    let text = assert_ok!(read_text(&test_data_dir().join("prose.txt")));
    let single = WordCounter::new(NonZeroUsize::MIN).count(&text);

    for k in 1..=32 {
        let counter = WordCounter::new(NonZeroUsize::new(k).expect("non-zero"));
        assert_eq!(assert_ok!(counter.count_parallel(&text)), single, "k={k}");
    }
}

#[test]
fn should_rank_the_most_frequent_words_of_prose() {
    let text = assert_ok!(read_text(&test_data_dir().join("prose.txt")));
    let counter = WordCounter::new(NonZeroUsize::new(4).expect("non-zero"));
    let counts = assert_ok!(counter.count_parallel(&text));

    let top = top_words(&counts, DEFAULT_TOP_N);
    assert_eq!(top.len(), DEFAULT_TOP_N);
    assert_eq!((top[0].word, top[0].count), ("the", 15));
    assert_eq!((top[1].word, top[1].count), ("of", 12));
    assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    assert_eq!(counts.get("über"), 1);
    assert_eq!(counts.get("déjà"), 1);
}
