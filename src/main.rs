use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use docsum::processing::{
    ChunkConfig, PipelineError, PipelineOptions, SummarizePipeline, ValidationError,
};
use docsum::summarization::{LengthBounds, SummarizerClient, get_summarizer, is_allowed_model};
use docsum::{config, logging};

/// Summarize a PDF or plain-text document with a local Ollama model.
#[derive(Parser)]
#[command(name = "docsum", version, about)]
struct Cli {
    /// Document to summarize (.pdf or .txt).
    input: PathBuf,
    /// Model identifier (overrides SUMMARIZE_MODEL).
    #[arg(long)]
    model: Option<String>,
    /// Advisory minimum summary length, in characters.
    #[arg(long)]
    min_length: Option<usize>,
    /// Advisory maximum summary length, in characters.
    #[arg(long)]
    max_length: Option<usize>,
    /// Maximum chunk window, in characters.
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Characters repeated between consecutive chunks.
    #[arg(long)]
    overlap: Option<usize>,
    /// Cap on the number of chunks summarized.
    #[arg(long)]
    max_chunks: Option<usize>,
    /// Skip the refinement pass over concatenated chunk summaries.
    #[arg(long)]
    no_refine: bool,
    /// Also print the per-chunk summaries.
    #[arg(long)]
    chunk_summaries: bool,
    /// Also print a preview of the extracted text.
    #[arg(long)]
    show_text: bool,
    /// Write the summary to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Characters of extracted text shown by `--show-text`.
const PREVIEW_CHARS: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_config()?;
    logging::init_tracing();
    let config = config::get_config();

    let model = cli.model.unwrap_or_else(|| config.model.clone());
    if !is_allowed_model(&model) {
        return Err(PipelineError::Validation(ValidationError::UnknownModel { model }).into());
    }

    let options = PipelineOptions {
        chunking: ChunkConfig {
            max_chunk_size: cli.chunk_size.unwrap_or(config.max_chunk_size),
            overlap: cli.overlap.unwrap_or(config.chunk_overlap),
            max_chunks: cli.max_chunks.or(config.max_chunks),
        },
        bounds: LengthBounds {
            min_length: cli.min_length.unwrap_or(config.min_summary_length),
            max_length: cli.max_length.unwrap_or(config.max_summary_length),
        },
        refine: !cli.no_refine && config.refine,
    };

    let client: Arc<dyn SummarizerClient> = get_summarizer(&config.ollama_url, &model);
    let pipeline = SummarizePipeline::new(client, options);

    let result = pipeline.run_path(&cli.input).await?;

    println!("{}", result.summary);
    println!();
    println!("Original length:   {} chars", result.stats.original_length);
    println!("Summary length:    {} chars", result.stats.summary_length);
    match result.stats.compression_ratio {
        Some(ratio) => println!("Compression ratio: {:.1}%", ratio * 100.0),
        None => println!("Compression ratio: n/a"),
    }

    if cli.chunk_summaries && result.chunk_summaries.len() > 1 {
        println!();
        for (index, summary) in result.chunk_summaries.iter().enumerate() {
            println!("--- chunk {} ---", index + 1);
            println!("{summary}");
        }
    }

    if cli.show_text {
        let preview: String = result.original_text.chars().take(PREVIEW_CHARS).collect();
        println!();
        println!("--- extracted text preview ---");
        if result.original_text.chars().count() > PREVIEW_CHARS {
            println!("{preview}...");
        } else {
            println!("{preview}");
        }
    }

    if let Some(path) = cli.output {
        std::fs::write(&path, &result.summary)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Summary written");
    }

    Ok(())
}
