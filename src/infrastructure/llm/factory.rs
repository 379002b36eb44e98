use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::openai::OpenAiCompatibleProvider;
use crate::domain::{DomainError, LlmProvider};

pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Which completion endpoint to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Mistral,
    OpenAi,
    /// Any OpenAI-compatible server; requires `base_url`
    Custom,
}

impl ProviderKind {
    /// Environment variable consulted when no key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Mistral => Some("MISTRAL_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Custom => None,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmSettings {
    /// Configured key first, then the provider's environment variable.
    ///
    /// Custom endpoints may run without a key.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Result<String, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        match self.provider.api_key_env() {
            Some(var) => lookup(var).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                DomainError::configuration(format!(
                    "No API key configured; set llm.api_key or {}",
                    var
                ))
            }),
            None => Ok(String::new()),
        }
    }
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider from configuration, reading keys from the process environment
    pub fn create(config: &LlmSettings) -> Result<Arc<dyn LlmProvider>, DomainError> {
        Self::create_with_env(config, |var| std::env::var(var).ok())
    }

    pub fn create_with_env<F>(
        config: &LlmSettings,
        lookup: F,
    ) -> Result<Arc<dyn LlmProvider>, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = config.resolve_api_key(lookup)?;
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let provider = match (config.provider, config.base_url.as_deref()) {
            (ProviderKind::Custom, None) => {
                return Err(DomainError::configuration(
                    "Custom provider requires llm.base_url",
                ));
            }
            (ProviderKind::Custom, Some(url)) => {
                OpenAiCompatibleProvider::with_base_url(http_client, "custom", api_key, url)
            }
            (ProviderKind::Mistral, Some(url)) => {
                OpenAiCompatibleProvider::with_base_url(http_client, "mistral", api_key, url)
            }
            (ProviderKind::Mistral, None) => OpenAiCompatibleProvider::mistral(http_client, api_key),
            (ProviderKind::OpenAi, Some(url)) => {
                OpenAiCompatibleProvider::with_base_url(http_client, "openai", api_key, url)
            }
            (ProviderKind::OpenAi, None) => OpenAiCompatibleProvider::new(http_client, api_key),
        };

        Ok(Arc::new(provider))
    }
}
