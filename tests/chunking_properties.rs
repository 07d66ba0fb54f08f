//! Property tests for the chunking strategies.

use docchat::{Chunker, Fragment};
use proptest::prelude::*;

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn short_text(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::char::range('a', 'z'), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

fn paragraph_case() -> impl Strategy<Value = (usize, usize, Vec<String>)> {
    (5usize..120, 0usize..40).prop_flat_map(|(max, overlap)| {
        (
            Just(max),
            Just(overlap),
            proptest::collection::vec(short_text(max), 1..30),
        )
    })
}

proptest! {
    /// Property: the fixed-size chunk count follows the sliding-window formula
    #[test]
    fn prop_fixed_size_count_and_shape(
        (max, overlap) in (1usize..30).prop_flat_map(|m| (Just(m), 0..m)),
        total in 1usize..300,
    ) {
        let chunks = Chunker::fixed_size(max, overlap).chunk(&[Fragment::new(words(total))]);

        let expected = if total > overlap {
            (total - overlap).div_ceil(max - overlap)
        } else {
            1
        };
        prop_assert_eq!(chunks.len(), expected);

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
        }
        for chunk in &chunks[..chunks.len() - 1] {
            prop_assert_eq!(word_count(&chunk.text), max);
        }
        let last = chunks.last().unwrap();
        prop_assert!(word_count(&last.text) <= max);
        let tail = format!("w{}", total - 1);
        prop_assert!(last.text.ends_with(&tail));
    }

    /// Property: an overlap at or above the window advances by whole windows
    #[test]
    fn prop_fixed_size_degenerate_overlap(
        max in 1usize..20,
        extra in 0usize..20,
        total in 1usize..200,
    ) {
        let overlap = max + extra;
        let chunks = Chunker::fixed_size(max, overlap).chunk(&[Fragment::new(words(total))]);

        prop_assert_eq!(chunks.len(), total.div_ceil(max));
        let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        prop_assert_eq!(rejoined, words(total));
    }

    /// Property: paragraph chunks stay within max + overlap + 1 characters
    #[test]
    fn prop_paragraph_size_bound((max, overlap, texts) in paragraph_case()) {
        let fragments: Vec<Fragment> = texts.iter().map(|t| Fragment::new(t.as_str())).collect();
        let chunks = Chunker::paragraph(max, overlap).chunk(&fragments);

        prop_assert!(!chunks.is_empty());
        for chunk in &chunks {
            let len = chunk.text.chars().count();
            prop_assert!(
                len <= max + overlap + 1,
                "chunk of {} chars exceeds bound {}",
                len,
                max + overlap + 1
            );
        }
    }

    /// Property: paragraph chunking without overlap keeps every fragment in order
    #[test]
    fn prop_paragraph_preserves_text((max, _overlap, texts) in paragraph_case()) {
        let fragments: Vec<Fragment> = texts.iter().map(|t| Fragment::new(t.as_str())).collect();
        let chunks = Chunker::paragraph(max, 0).chunk(&fragments);

        let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        prop_assert_eq!(rejoined, texts.join(" "));
    }

    /// Property: titles open chunks and text order is preserved
    #[test]
    fn prop_title_boundaries(
        max in 20usize..200,
        specs in proptest::collection::vec((any::<bool>(), 0usize..8), 1..25),
    ) {
        let fragments: Vec<Fragment> = specs
            .iter()
            .enumerate()
            .map(|(i, &(is_title, filler))| {
                let text = format!("frag{i}x {}", "lorem ".repeat(filler)).trim().to_string();
                let fragment = Fragment::new(text);
                if is_title { fragment.as_title() } else { fragment }
            })
            .collect();

        let chunks = Chunker::title(max).chunk(&fragments);

        let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        let original = fragments.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join(" ");
        prop_assert_eq!(rejoined, original);

        for (i, fragment) in fragments.iter().enumerate() {
            if fragment.is_title() {
                let marker = format!("frag{i}x");
                prop_assert!(
                    chunks.iter().any(|c| c.text == marker || c.text.starts_with(&format!("{marker} "))),
                    "title fragment {} does not start a chunk",
                    i
                );
            }
        }
    }
}

#[test]
fn test_fixed_size_example() {
    let chunks = Chunker::fixed_size(4, 1).chunk(&[Fragment::new(words(10))]);
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]
    );
}
