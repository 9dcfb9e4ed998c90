/// Ceiling on the size of one delivered transcript segment, in characters.
pub const MAX_SEGMENT_CHARS: usize = 4000;

/// Split a transcript into segments of at most `max_chars` characters each.
/// Splits on character boundaries, so concatenating the segments gives back
/// the input exactly. An empty transcript yields no segments.
pub fn split_transcript(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "segment size must be positive");

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_chars {
            segments.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_segment() {
        assert_eq!(split_transcript("hello", 4000), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(split_transcript("", 4000).is_empty());
    }

    #[test]
    fn splits_on_char_boundaries() {
        // Two-byte characters must not be split mid-encoding.
        let text = "й".repeat(5);
        let segments = split_transcript(&text, 2);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments.concat(), text);
    }
}
