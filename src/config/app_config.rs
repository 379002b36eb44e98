use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::qa::QaConfig;
use crate::infrastructure::llm::LlmSettings;
use crate::infrastructure::observability::ObservabilityConfig;

pub use crate::infrastructure::logging::{LogFormat, LoggingConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub pipeline: QaConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Indexing and retrieval depth for the CLI's keyword index.
///
/// Unknown keys are rejected so a misspelled or unsupported setting fails
/// at startup instead of being ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Passages returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_top_k() -> usize {
    10
}

fn default_chunk_size() -> usize {
    ChunkingConfig::default().chunk_size
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl RetrievalConfig {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder()?.try_deserialize()
    }

    fn builder() -> Result<config::Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("DOCQA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }

    /// Pipeline settings with the retrieval depth applied
    pub fn qa_config(&self) -> QaConfig {
        self.pipeline
            .clone()
            .with_retrieval_top_k(self.retrieval.top_k)
    }
}
