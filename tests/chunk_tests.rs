// Delivery chunking: segments stay under the display ceiling and
// concatenate back to the original transcript byte for byte.

use scribe_backend::common::chunk::{MAX_SEGMENT_CHARS, split_transcript};

#[test]
fn segment_count_matches_ceiling_division() {
    for len in [0usize, 1, 3_999, 4_000, 4_001, 8_000, 12_345] {
        let text = "a".repeat(len);
        let segments = split_transcript(&text, MAX_SEGMENT_CHARS);

        assert_eq!(
            segments.len(),
            len.div_ceil(MAX_SEGMENT_CHARS),
            "wrong segment count for length {}",
            len
        );
        assert!(segments.iter().all(|s| s.chars().count() <= MAX_SEGMENT_CHARS));
        assert_eq!(segments.concat(), text);
    }
}

#[test]
fn multibyte_text_survives_chunking() {
    // Characters, not bytes: 5000 two-byte chars must split 4000/1000.
    let text = "ж".repeat(5_000);
    let segments = split_transcript(&text, MAX_SEGMENT_CHARS);

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].chars().count(), 4_000);
    assert_eq!(segments[1].chars().count(), 1_000);
    assert_eq!(segments.concat(), text);
}

#[test]
fn small_segment_sizes_preserve_order() {
    let text = "abcdefghij";
    let segments = split_transcript(text, 3);

    assert_eq!(segments, vec!["abc", "def", "ghi", "j"]);
}
