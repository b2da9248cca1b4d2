use crate::errors::{AppError, AppResult};

/// Boundaries tried tier by tier when picking where a chunk ends. Within a
/// tier the latest match wins.
const SEPARATOR_TIERS: [&[&str]; 4] = [&["\n\n"], &["\n"], &[". ", "? ", "! "], &[" "]];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
}

impl TextChunk {
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Splits text into bounded, overlapping chunks.
///
/// Every chunk holds at most `chunk_size` characters and each chunk after the
/// first starts exactly `chunk_overlap` characters before the previous one
/// ended. A chunk boundary lands just after the strongest separator available
/// in the window (paragraph, line, sentence, word) and only falls back to a hard
/// cut when none fits.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::ValidationError(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::ValidationError(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let limit = (start + self.chunk_size).min(total);
            let end = if limit == total {
                total
            } else {
                self.find_break(&chars, start, limit)
            };

            chunks.push(TextChunk {
                index: chunks.len(),
                content: chars[start..end].iter().collect(),
            });

            if end == total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        log::debug!("Split {} characters into {} chunks", total, chunks.len());
        chunks
    }

    /// Latest position in `(start + overlap, limit]` that directly follows a
    /// separator, trying stronger separators first. Staying past
    /// `start + overlap` guarantees the next chunk starts after this one.
    fn find_break(&self, chars: &[char], start: usize, limit: usize) -> usize {
        let floor = start + self.chunk_overlap;

        for tier in SEPARATOR_TIERS {
            let seps: Vec<Vec<char>> = tier.iter().map(|sep| sep.chars().collect()).collect();
            let mut end = limit;
            while end > floor {
                let found = seps.iter().any(|sep| {
                    end >= start + sep.len() && chars[end - sep.len()..end] == sep[..]
                });
                if found {
                    return end;
                }
                end -= 1;
            }
        }

        limit
    }
}

/// The excerpt handed to the model: the first `count` chunks joined with
/// single spaces.
pub fn context_window(chunks: &[TextChunk], count: usize) -> String {
    chunks
        .iter()
        .take(count)
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        let paragraph = "Photosynthesis converts light energy into chemical energy. \
                         Chlorophyll absorbs mostly blue and red light. \
                         Oxygen is released as a by-product.";
        (0..12)
            .map(|i| format!("Section {}. {}", i, paragraph))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn reconstruct(chunks: &[TextChunk], overlap: usize) -> String {
        let mut text = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { overlap };
            text.extend(chunk.content.chars().skip(skip));
        }
        text
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 99).is_ok());
    }

    #[test]
    fn empty_text_has_no_chunks() {
        let chunker = TextChunker::new(1500, 200).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = TextChunker::new(1500, 200).unwrap();
        let chunks = chunker.chunk("The capital of France is Paris.");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "The capital of France is Paris.");
    }

    #[test]
    fn chunks_respect_size_bound_and_exact_overlap() {
        let chunker = TextChunker::new(300, 50).unwrap();
        let text = sample_text();
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.char_count() <= 300));

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let next: Vec<char> = pair[1].content.chars().collect();
            assert_eq!(prev[prev.len() - 50..], next[..50]);
        }
    }

    #[test]
    fn non_overlapping_parts_rebuild_the_source() {
        let chunker = TextChunker::new(300, 50).unwrap();
        let text = sample_text();

        assert_eq!(reconstruct(&chunker.chunk(&text), 50), text);
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = TextChunker::new(250, 40).unwrap();
        let text = sample_text();

        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let chunker = TextChunker::new(60, 5).unwrap();
        let text = "First paragraph is short.\n\nSecond paragraph follows here and runs on.";
        let chunks = chunker.chunk(text);

        assert!(chunks[0].content.ends_with("\n\n"));
    }

    #[test]
    fn question_and_exclamation_marks_end_sentences() {
        let chunker = TextChunker::new(30, 5).unwrap();

        let chunks = chunker.chunk("Is this a question? It certainly is a long one");
        assert_eq!(chunks[0].content, "Is this a question? ");

        let chunks = chunker.chunk("What a sentence! It certainly is a long one");
        assert_eq!(chunks[0].content, "What a sentence! ");
    }

    #[test]
    fn falls_back_to_hard_cut_without_separators() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks[0].content, "abcdefghij");
        assert_eq!(chunks[1].content, "hijklmnopq");
        assert_eq!(reconstruct(&chunks, 3), text);
    }

    #[test]
    fn handles_multibyte_characters() {
        let chunker = TextChunker::new(8, 2).unwrap();
        let text = "éèêëēėęàáâäæ";
        let chunks = chunker.chunk(text);

        assert!(chunks.iter().all(|c| c.char_count() <= 8));
        assert_eq!(reconstruct(&chunks, 2), text);
    }

    #[test]
    fn context_window_joins_first_chunks() {
        let chunks: Vec<TextChunk> = ["one", "two", "three", "four"]
            .iter()
            .enumerate()
            .map(|(index, c)| TextChunk {
                index,
                content: c.to_string(),
            })
            .collect();

        assert_eq!(context_window(&chunks, 3), "one two three");
        assert_eq!(context_window(&chunks[..2], 3), "one two");
    }
}
