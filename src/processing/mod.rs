//! Document summarization pipeline: chunking, per-chunk summarization, and aggregation.

pub mod aggregate;
pub mod chunking;
mod service;
pub mod types;

pub use chunking::{Chunk, ChunkConfig};
pub use service::{PipelineOptions, SummarizePipeline};
pub use types::{
    AggregateResult, ChunkingError, PipelineError, SummaryStats, ValidationError,
};
