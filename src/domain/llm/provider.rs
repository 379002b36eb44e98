use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for LLM providers (Mistral, OpenAI, any chat-completions endpoint)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::llm::Message;

    /// Mock provider that replays queued completions and records prompts
    #[derive(Debug)]
    pub struct MockLlmProvider {
        name: &'static str,
        responses: Mutex<VecDeque<String>>,
        fallback: Option<String>,
        error: Option<String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl MockLlmProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                responses: Mutex::new(VecDeque::new()),
                fallback: None,
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Respond with this text to every call
        pub fn with_response(mut self, content: impl Into<String>) -> Self {
            self.fallback = Some(content.into());
            self
        }

        /// Respond with these texts in order, then fall back to `with_response`
        pub fn with_responses<I, S>(self, contents: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.responses
                .lock()
                .unwrap()
                .extend(contents.into_iter().map(Into::into));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.requests.lock().unwrap().push(request);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.fallback.clone())
                .ok_or_else(|| DomainError::provider(self.name, "No mock response configured"))?;

            Ok(LlmResponse::new(
                format!("mock-{}", self.call_count()),
                model.to_string(),
                Message::assistant(content),
            ))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }
}
