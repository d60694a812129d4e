//! Combining per-chunk summaries into one document-level summary.

use crate::summarization::{LengthBounds, SummarizationError, SummarizerClient};

use super::chunking::Chunk;
use super::types::{AggregateResult, SummaryStats};

/// Separator placed between chunk summaries in the concatenation.
const CHUNK_SUMMARY_SEPARATOR: &str = "\n\n";

/// Summarize every chunk in order and fold the results into one summary.
///
/// Chunks are summarized sequentially; the resulting summaries list is
/// index-stable with respect to the chunk sequence. When `refine` is set and
/// more than one chunk was summarized, the blank-line concatenation of the
/// chunk summaries goes through the model once more to produce the final
/// summary; a single-chunk document makes refinement a no-op.
pub async fn aggregate(
    original_text: &str,
    chunks: &[Chunk],
    client: &dyn SummarizerClient,
    bounds: LengthBounds,
    refine: bool,
) -> Result<AggregateResult, SummarizationError> {
    let total = chunks.len();
    let mut chunk_summaries = Vec::with_capacity(total);
    for chunk in chunks {
        tracing::info!(
            chunk = chunk.index + 1,
            total,
            span_start = chunk.start,
            span_end = chunk.end,
            "Summarizing chunk"
        );
        let summary = client.summarize(&chunk.text, bounds).await?;
        chunk_summaries.push(summary);
    }

    let joined = chunk_summaries.join(CHUNK_SUMMARY_SEPARATOR);
    let summary = if refine && chunk_summaries.len() > 1 {
        tracing::info!(chunks = total, "Refining concatenated chunk summaries");
        client.summarize(&joined, bounds).await?
    } else {
        joined
    };

    let stats = SummaryStats::compute(original_text.chars().count(), summary.chars().count());
    tracing::info!(
        original_length = stats.original_length,
        summary_length = stats.summary_length,
        compression_ratio = ?stats.compression_ratio,
        "Summary generated"
    );

    Ok(AggregateResult {
        summary,
        chunk_summaries,
        original_text: original_text.to_string(),
        stats,
    })
}
