//! Pipeline orchestration: validate, extract, chunk, aggregate.

use std::path::Path;
use std::sync::Arc;

use crate::extract::{self, DocumentKind, SpooledDocument};
use crate::summarization::{LengthBounds, SummarizerClient};

use super::aggregate::aggregate;
use super::chunking::{ChunkConfig, chunk_text};
use super::types::{AggregateResult, PipelineError, ValidationError};

/// Options applied to one summarization request.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Chunk windowing parameters.
    pub chunking: ChunkConfig,
    /// Advisory summary length bounds.
    pub bounds: LengthBounds,
    /// Whether to run the refinement pass.
    pub refine: bool,
}

/// Runs the full summarization pipeline over one document at a time.
///
/// The pipeline owns a long-lived handle to the summarizer client so repeat
/// requests reuse the same connection pool. Construct it once near process
/// start; its behavior is a pure function of the options and the input
/// document, with no ambient state.
pub struct SummarizePipeline {
    client: Arc<dyn SummarizerClient>,
    options: PipelineOptions,
}

impl SummarizePipeline {
    /// Build a pipeline around an existing summarizer client.
    pub fn new(client: Arc<dyn SummarizerClient>, options: PipelineOptions) -> Self {
        Self { client, options }
    }

    /// Summarize the document at `path`, inferring its kind from the file name.
    ///
    /// Validation happens before any extraction attempt: an unsupported
    /// extension or a bad chunk configuration aborts the request without
    /// touching the file.
    pub async fn run_path(&self, path: &Path) -> Result<AggregateResult, PipelineError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let kind = validate_filename(filename)?;
        self.run_extracted(path, kind).await
    }

    /// Summarize uploaded bytes under their declared file name.
    ///
    /// The bytes are spooled to a temporary file for extraction; the spool is
    /// removed when this function returns, on success and failure alike.
    pub async fn run_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<AggregateResult, PipelineError> {
        let kind = validate_filename(filename)?;
        let spool = SpooledDocument::write(kind, bytes).map_err(|source| {
            extract::ExtractionError::Io {
                path: Path::new(filename).to_path_buf(),
                source,
            }
        })?;
        self.run_extracted(spool.path(), spool.kind()).await
    }

    async fn run_extracted(
        &self,
        path: &Path,
        kind: DocumentKind,
    ) -> Result<AggregateResult, PipelineError> {
        self.options
            .chunking
            .validate()
            .map_err(ValidationError::from)?;

        tracing::info!(path = %path.display(), ?kind, "Extracting text");
        let text = extract::extract_path(path, kind)?;

        let chunks = chunk_text(&text, &self.options.chunking).map_err(ValidationError::from)?;
        tracing::info!(
            chars = text.chars().count(),
            chunks = chunks.len(),
            "Chunked document"
        );

        let result = aggregate(
            &text,
            &chunks,
            self.client.as_ref(),
            self.options.bounds,
            self.options.refine,
        )
        .await?;
        Ok(result)
    }
}

fn validate_filename(filename: &str) -> Result<DocumentKind, ValidationError> {
    DocumentKind::from_filename(filename).ok_or_else(|| ValidationError::UnsupportedExtension {
        filename: filename.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::SummarizationError;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SummarizerClient for FixedSummarizer {
        async fn summarize(
            &self,
            _text: &str,
            _bounds: LengthBounds,
        ) -> Result<String, SummarizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("fixed summary".into())
        }
    }

    fn pipeline(options: PipelineOptions) -> (SummarizePipeline, Arc<FixedSummarizer>) {
        let client = Arc::new(FixedSummarizer {
            calls: AtomicUsize::new(0),
        });
        (
            SummarizePipeline::new(client.clone(), options),
            client,
        )
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            chunking: ChunkConfig {
                max_chunk_size: 3000,
                overlap: 200,
                max_chunks: None,
            },
            bounds: LengthBounds {
                min_length: 30,
                max_length: 130,
            },
            refine: true,
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_extension_before_extraction() {
        let (pipeline, client) = pipeline(options());
        let error = pipeline
            .run_bytes("notes.docx", b"irrelevant")
            .await
            .expect_err("docx must be rejected");
        assert!(matches!(
            error,
            PipelineError::Validation(ValidationError::UnsupportedExtension { .. })
        ));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_bad_chunk_configuration() {
        let mut bad = options();
        bad.chunking.overlap = bad.chunking.max_chunk_size;
        let (pipeline, _client) = pipeline(bad);
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").expect("temp file");
        file.write_all(b"some document text").expect("write");
        let error = pipeline.run_path(file.path()).await.expect_err("bad config");
        assert!(matches!(
            error,
            PipelineError::Validation(ValidationError::Chunking(_))
        ));
    }

    #[tokio::test]
    async fn summarizes_text_bytes_end_to_end() {
        let (pipeline, client) = pipeline(options());
        let result = pipeline
            .run_bytes("notes.txt", b"  a short note to summarize  ")
            .await
            .expect("pipeline run");
        assert_eq!(result.summary, "fixed summary");
        assert_eq!(result.chunk_summaries.len(), 1);
        assert_eq!(result.original_text, "a short note to summarize");
        // Single chunk: the refinement pass must not fire.
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_document_aborts_with_extraction_error() {
        let (pipeline, client) = pipeline(options());
        let error = pipeline
            .run_bytes("empty.txt", b"   ")
            .await
            .expect_err("empty document");
        assert!(matches!(error, PipelineError::Extraction(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
