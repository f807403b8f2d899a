use serde::{Deserialize, Serialize};

use crate::corpus::Chunk;
use crate::error::AppError;

/// Word-window chunking parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Words per window.
    pub size: usize,
    /// Words shared by consecutive windows of the same document.
    pub overlap: usize,
    /// Windows with this many words or fewer are dropped.
    pub min_words: usize,
    /// Documents whose raw content is shorter than this (in characters) are skipped.
    pub min_content_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            size: 400,
            overlap: 50,
            min_words: 50,
            min_content_chars: 200,
        }
    }
}

impl ChunkingOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.size == 0 {
            return Err(AppError::new("CONFIG_INVALID", "Chunk size must be greater than zero"));
        }
        if self.overlap >= self.size {
            return Err(
                AppError::new("CONFIG_INVALID", "Chunk overlap must be smaller than chunk size")
                    .with_details(format!("size={}; overlap={}", self.size, self.overlap)),
            );
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.size - self.overlap
    }
}

/// Split `text` into overlapping word windows attributed to `title`.
///
/// Windows start at word offsets `0, step, 2*step, ...` while the offset is
/// inside the text. Only the trailing windows can be shorter than `size`, and
/// any window with `min_words` words or fewer is discarded. `chunk_index`
/// counts accepted windows, so it stays contiguous from zero.
pub fn chunk_text(text: &str, title: &str, opts: &ChunkingOptions) -> Result<Vec<Chunk>, AppError> {
    opts.validate()?;

    let words: Vec<&str> = text.split_whitespace().collect();
    let step = opts.step();

    let mut out: Vec<Chunk> = Vec::new();
    let mut start = 0usize;
    while start < words.len() {
        let end = (start + opts.size).min(words.len());
        let window = &words[start..end];
        if window.len() > opts.min_words {
            let chunk_index = out.len() as u32;
            out.push(Chunk {
                id: Chunk::id_for(title, chunk_index),
                title: title.to_string(),
                chunk_index,
                text: window.join(" "),
            });
        }
        start += step;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn nine_hundred_words_yield_three_chunks() {
        let text = numbered_words(900);
        let chunks = chunk_text(&text, "Dinacharya", &ChunkingOptions::default()).expect("chunk");
        let lens: Vec<usize> = chunks.iter().map(|c| c.word_count()).collect();
        assert_eq!(lens, vec![400, 400, 200]);
        assert_eq!(
            chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(chunks[1].text.starts_with("w350 "));
        assert!(chunks[2].text.starts_with("w700 "));
        assert_eq!(chunks[2].id, "Dinacharya_chunk_2");
    }

    #[test]
    fn short_trailing_window_is_dropped() {
        // Offsets 0 and 350; the second window has only 40 words.
        let chunks = chunk_text(&numbered_words(390), "t", &ChunkingOptions::default()).expect("chunk");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].word_count(), 390);
    }

    #[test]
    fn threshold_is_strictly_greater_than_min_words() {
        let opts = ChunkingOptions::default();
        assert!(chunk_text(&numbered_words(50), "t", &opts).expect("chunk").is_empty());
        assert_eq!(chunk_text(&numbered_words(51), "t", &opts).expect("chunk").len(), 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("   \n\t ", "t", &ChunkingOptions::default())
            .expect("chunk")
            .is_empty());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let opts = ChunkingOptions {
            size: 50,
            overlap: 50,
            ..ChunkingOptions::default()
        };
        let err = chunk_text("a b c", "t", &opts).expect_err("should error");
        assert_eq!(err.code, "CONFIG_INVALID");
    }

    #[test]
    fn window_invariants_hold_across_lengths() {
        let opts = ChunkingOptions::default();
        for n in (0..2000).step_by(37) {
            let text = numbered_words(n);
            let chunks = chunk_text(&text, "doc", &opts).expect("chunk");

            // Deterministic.
            assert_eq!(chunks, chunk_text(&text, "doc", &opts).expect("chunk"));

            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.chunk_index as usize, i);
                assert_eq!(c.id, format!("doc_chunk_{i}"));
                let wc = c.word_count();
                assert!(wc > opts.min_words && wc <= opts.size, "n={n} wc={wc}");
            }

            // Consecutive windows share exactly `overlap` words at the boundary.
            for pair in chunks.windows(2) {
                let prev: Vec<&str> = pair[0].text.split_whitespace().collect();
                let next: Vec<&str> = pair[1].text.split_whitespace().collect();
                if prev.len() == opts.size {
                    assert_eq!(&prev[opts.size - opts.overlap..], &next[..opts.overlap]);
                }
            }
        }
    }
}
