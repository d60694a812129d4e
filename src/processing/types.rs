//! Core data types and error definitions for the summarization pipeline.

use crate::extract::{ALLOWED_EXTENSIONS, ExtractionError};
use crate::summarization::{ALLOWED_MODELS, SummarizationError};
use thiserror::Error;

/// Errors produced while windowing raw text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The caller configured an impossible chunk window.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap at least as large as the window would never advance the cursor.
    #[error("chunk overlap {overlap} must be smaller than the chunk size {max_chunk_size}")]
    OverlapTooLarge {
        /// Requested overlap, in characters.
        overlap: usize,
        /// Requested chunk window, in characters.
        max_chunk_size: usize,
    },
}

/// Request-level validation failures, raised before any extraction is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The uploaded file's extension is not on the accepted list.
    #[error(
        "unsupported file type '{filename}' (allowed: {allowed})",
        allowed = ALLOWED_EXTENSIONS.join(", ")
    )]
    UnsupportedExtension {
        /// Name of the rejected file.
        filename: String,
    },
    /// Chunking parameters were rejected.
    #[error(transparent)]
    Chunking(#[from] ChunkingError),
    /// The requested model is not on the accepted list.
    #[error(
        "unknown model '{model}' (allowed: {allowed})",
        allowed = ALLOWED_MODELS.join(", ")
    )]
    UnknownModel {
        /// Name of the rejected model.
        model: String,
    },
}

/// Errors emitted by the document summarization pipeline.
///
/// Every failure aborts the current request with no partial output; the CLI
/// boundary renders exactly one user-visible message per error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before extraction started.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// Text extraction failed or produced nothing.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),
    /// The summarization model invocation failed.
    #[error("Failed to generate summary: {0}")]
    Summarization(#[from] SummarizationError),
}

/// Size statistics derived from one completed summarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    /// Character count of the extracted document text.
    pub original_length: usize,
    /// Character count of the final summary.
    pub summary_length: usize,
    /// `1 - summary/original`; `None` when the original length is zero.
    pub compression_ratio: Option<f64>,
}

impl SummaryStats {
    /// Compute statistics, guarding the zero-length-original edge case.
    pub fn compute(original_length: usize, summary_length: usize) -> Self {
        let compression_ratio = if original_length == 0 {
            None
        } else {
            Some(1.0 - summary_length as f64 / original_length as f64)
        };
        Self {
            original_length,
            summary_length,
            compression_ratio,
        }
    }
}

/// Everything produced by one run of the pipeline.
///
/// Held by the caller for display only; nothing is persisted and the next
/// run simply replaces it.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    /// The document-level summary.
    pub summary: String,
    /// Per-chunk summaries, in chunk order.
    pub chunk_summaries: Vec<String>,
    /// The extracted document text the summary was produced from.
    pub original_text: String,
    /// Derived size statistics.
    pub stats: SummaryStats,
}
