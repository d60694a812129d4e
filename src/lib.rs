#![deny(missing_docs)]

//! Core library for the docsum document summarizer.

/// Environment-driven configuration management.
pub mod config;
/// Text extraction from PDF and plain-text documents.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Chunking and summary-aggregation pipeline.
pub mod processing;
/// Summarization client abstraction and the Ollama adapter.
pub mod summarization;
