use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configured model is not on the allow-list.
    #[error(
        "Unknown summarization model '{0}' (allowed: {allowed})",
        allowed = crate::summarization::ALLOWED_MODELS.join(", ")
    )]
    UnknownModel(String),
}

/// Runtime configuration for the summarizer.
///
/// Every variable is optional; defaults mirror the values the pipeline was
/// tuned with (130/30 character summary bounds, 3000/200 chunk windows).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Model identifier passed to the Ollama runtime.
    pub model: String,
    /// Base URL of the Ollama instance serving the model.
    pub ollama_url: String,
    /// Advisory upper bound on summary length, in characters.
    pub max_summary_length: usize,
    /// Advisory lower bound on summary length, in characters.
    pub min_summary_length: usize,
    /// Maximum chunk window, in characters.
    pub max_chunk_size: usize,
    /// Characters repeated between consecutive chunks.
    pub chunk_overlap: usize,
    /// Optional cap on the number of chunks summarized per document.
    pub max_chunks: Option<usize>,
    /// Whether to run the refinement pass over concatenated chunk summaries.
    pub refine: bool,
}

/// Default model identifier when `SUMMARIZE_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "llama3.2";
/// Default Ollama endpoint when `OLLAMA_URL` is unset.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
/// Default advisory maximum summary length, in characters.
pub const DEFAULT_MAX_SUMMARY_LENGTH: usize = 130;
/// Default advisory minimum summary length, in characters.
pub const DEFAULT_MIN_SUMMARY_LENGTH: usize = 30;
/// Default chunk window, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 3000;
/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model =
            load_env_optional("SUMMARIZE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if !crate::summarization::is_allowed_model(&model) {
            return Err(ConfigError::UnknownModel(model));
        }
        Ok(Self {
            model,
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            max_summary_length: load_parsed("SUMMARIZE_MAX_LENGTH")?
                .unwrap_or(DEFAULT_MAX_SUMMARY_LENGTH),
            min_summary_length: load_parsed("SUMMARIZE_MIN_LENGTH")?
                .unwrap_or(DEFAULT_MIN_SUMMARY_LENGTH),
            max_chunk_size: load_parsed("SUMMARIZE_CHUNK_SIZE")?.unwrap_or(DEFAULT_MAX_CHUNK_SIZE),
            chunk_overlap: load_parsed("SUMMARIZE_CHUNK_OVERLAP")?
                .unwrap_or(DEFAULT_CHUNK_OVERLAP),
            max_chunks: load_parsed("SUMMARIZE_MAX_CHUNKS")?,
            refine: load_parsed_bool("SUMMARIZE_REFINE")?.unwrap_or(true),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn load_parsed_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    load_env_optional(key)
        .map(|value| match value.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key.to_string())),
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// Only the CLI boundary reads the cached config; the pipeline itself takes
/// explicit option structs so its behavior is a pure function of its inputs.
pub fn init_config() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        model = %config.model,
        ollama_url = %config.ollama_url,
        max_chunk_size = config.max_chunk_size,
        chunk_overlap = config.chunk_overlap,
        refine = config.refine,
        "Loaded configuration"
    );
    let _ = CONFIG.set(config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_env(key: &str, value: &str) {
        // SAFETY: Tests in this binary touch these variables only from this
        // single sequential test function.
        unsafe { env::set_var(key, value) }
    }

    fn unset_env(key: &str) {
        // SAFETY: See `set_env`.
        unsafe { env::remove_var(key) }
    }

    #[test]
    fn from_env_rejects_malformed_values() {
        set_env("SUMMARIZE_CHUNK_SIZE", "three thousand");
        let error = Config::from_env().expect_err("non-numeric chunk size");
        assert!(
            matches!(error, ConfigError::InvalidValue(ref key) if key == "SUMMARIZE_CHUNK_SIZE")
        );
        unset_env("SUMMARIZE_CHUNK_SIZE");

        set_env("SUMMARIZE_MAX_LENGTH", "-1");
        let error = Config::from_env().expect_err("negative length");
        assert!(
            matches!(error, ConfigError::InvalidValue(ref key) if key == "SUMMARIZE_MAX_LENGTH")
        );
        unset_env("SUMMARIZE_MAX_LENGTH");

        set_env("SUMMARIZE_REFINE", "maybe");
        let error = Config::from_env().expect_err("non-boolean refine toggle");
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "SUMMARIZE_REFINE"));
        unset_env("SUMMARIZE_REFINE");

        set_env("SUMMARIZE_MODEL", "gpt-4");
        let error = Config::from_env().expect_err("off-list model");
        assert!(matches!(error, ConfigError::UnknownModel(ref model) if model == "gpt-4"));
        assert!(error.to_string().contains("llama3.2"));
        unset_env("SUMMARIZE_MODEL");

        let config = Config::from_env().expect("defaults after cleanup");
        assert_eq!(config.max_chunk_size, DEFAULT_MAX_CHUNK_SIZE);
    }

    #[test]
    fn defaults_match_tuned_values() {
        let config = Config {
            model: DEFAULT_MODEL.into(),
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            max_summary_length: DEFAULT_MAX_SUMMARY_LENGTH,
            min_summary_length: DEFAULT_MIN_SUMMARY_LENGTH,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            max_chunks: None,
            refine: true,
        };
        assert_eq!(config.max_chunk_size, 3000);
        assert_eq!(config.chunk_overlap, 200);
        assert!(config.max_chunk_size > config.chunk_overlap);
    }
}
