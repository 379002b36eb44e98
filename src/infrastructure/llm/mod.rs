//! LLM provider implementations

mod factory;
mod http_client;
mod openai;

pub use factory::{DEFAULT_MODEL, LlmSettings, LlmProviderFactory, ProviderKind};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{DEFAULT_MISTRAL_BASE_URL, DEFAULT_OPENAI_BASE_URL, OpenAiCompatibleProvider};
