//! Fixed-window chunking of extracted document text.
//!
//! Long documents do not fit the summarization model's input limit, so the
//! pipeline windows them into overlapping character spans before the model
//! ever sees them. Highlights:
//!
//! - Deterministic: the chunk sequence is a pure function of the text and the
//!   configuration, so a rerun over the same document reproduces it exactly.
//! - Overlap: the last `overlap` characters of a chunk reappear at the start
//!   of the next one, so sentences straddling a boundary stay visible to at
//!   least one model call.
//! - Bounded: an optional `max_chunks` cap truncates pathologically long
//!   documents instead of letting latency grow without limit.
//!
//! All sizes and offsets are in characters, not bytes, so multi-byte UTF-8
//! input never splits inside a code point.

use super::types::ChunkingError;

/// Parameters controlling how extracted text is windowed.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Hard upper bound on chunk length, in characters.
    pub max_chunk_size: usize,
    /// Characters repeated between consecutive chunks.
    pub overlap: usize,
    /// Optional cap on the number of chunks emitted.
    pub max_chunks: Option<usize>,
}

impl ChunkConfig {
    /// Reject configurations that would produce no progress or no chunks.
    ///
    /// An overlap at least as large as the window moves the cursor backwards
    /// or not at all, so it is a configuration error rather than an input
    /// the chunker tries to limp through.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.max_chunk_size == 0 {
            return Err(ChunkingError::InvalidChunkSize);
        }
        if self.overlap >= self.max_chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.overlap,
                max_chunk_size: self.max_chunk_size,
            });
        }
        Ok(())
    }
}

/// One contiguous window of the extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence.
    pub index: usize,
    /// Start offset in characters, inclusive.
    pub start: usize,
    /// End offset in characters, exclusive.
    pub end: usize,
    /// The windowed text.
    pub text: String,
}

/// Window `text` into overlapping chunks according to `config`.
///
/// The spans cover the whole text with no gaps; every chunk is at most
/// `max_chunk_size` characters and consecutive chunks share `overlap`
/// characters. A text that fits in one window comes back as a single chunk
/// with no overlap applied. When `max_chunks` truncates the sequence the
/// discarded remainder is logged, not reported as an error.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ChunkingError> {
    config.validate()?;
    warn_on_pathological_stride(config);

    // Byte offset of every char boundary, so char-unit spans slice safely.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    boundaries.push(text.len());
    let char_len = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < char_len {
        let end = char_len.min(start + config.max_chunk_size);
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            text: text[boundaries[start]..boundaries[end]].to_string(),
        });
        if end == char_len {
            break;
        }
        start = end - config.overlap;
    }

    if let Some(cap) = config.max_chunks {
        if chunks.len() > cap {
            tracing::warn!(
                produced = chunks.len(),
                cap,
                discarded = chunks.len() - cap,
                "Chunk cap reached; discarding remainder of the document"
            );
            chunks.truncate(cap);
        }
    }

    Ok(chunks)
}

/// Warn when the stride between chunks is small enough to explode chunk
/// counts into near-duplicates, and nothing bounds the sequence.
fn warn_on_pathological_stride(config: &ChunkConfig) {
    let stride = config.max_chunk_size - config.overlap;
    if config.max_chunks.is_none() && stride * 10 < config.max_chunk_size {
        tracing::warn!(
            max_chunk_size = config.max_chunk_size,
            overlap = config.overlap,
            stride,
            "Overlap close to chunk size produces many near-duplicate chunks; consider a max_chunks cap"
        );
    }
}
