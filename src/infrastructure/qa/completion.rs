//! Single model call shared by the step components

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::qa::{QaStep, StepError, StepSettings};
use crate::infrastructure::observability::record_llm_call;

/// Model handle plus the sampling settings of one step
#[derive(Debug, Clone)]
pub struct StepModel {
    pub provider: Arc<dyn LlmProvider>,
    pub model: String,
    pub settings: StepSettings,
}

impl StepModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, settings: StepSettings) -> Self {
        Self {
            provider,
            model: model.into(),
            settings,
        }
    }

    /// Run one completion. `Ok(None)` means the model answered with nothing usable.
    pub async fn complete(&self, step: QaStep, prompt: String) -> Result<Option<String>, StepError> {
        debug!(
            step = step.as_str(),
            provider = self.provider.provider_name(),
            model = %self.model,
            prompt_chars = prompt.len(),
            "Invoking model"
        );

        let request =
            LlmRequest::completion(prompt, self.settings.max_tokens, self.settings.temperature);

        let started = Instant::now();
        let result = self.provider.chat(&self.model, request).await;
        record_llm_call(step.as_str(), result.is_ok(), started.elapsed());

        let response = result.map_err(|e| StepError::model_invocation(step, e.to_string()))?;
        let content = response.content().map(|c| c.trim().to_string());

        debug!(
            step = step.as_str(),
            response_chars = content.as_ref().map_or(0, String::len),
            "Model responded"
        );

        Ok(content.filter(|c| !c.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;

    #[tokio::test]
    async fn test_complete_passes_step_settings() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("  YES \n"));
        let model = StepModel::new(provider.clone(), "m", StepSettings::new(0.3, 300));

        let content = model.complete(QaStep::Research, "prompt".to_string()).await.unwrap();

        assert_eq!(content.as_deref(), Some("YES"));
        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request.max_tokens, Some(300));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.last_user_content(), Some("prompt"));
    }

    #[tokio::test]
    async fn test_blank_response_is_none() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("   "));
        let model = StepModel::new(provider, "m", StepSettings::new(0.0, 10));

        let content = model.complete(QaStep::Verify, "p".to_string()).await.unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_is_tagged_with_step() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_error("HTTP 503"));
        let model = StepModel::new(provider, "m", StepSettings::new(0.0, 10));

        let err = model
            .complete(QaStep::CheckRelevance, "p".to_string())
            .await
            .unwrap_err();

        assert_eq!(err.step(), QaStep::CheckRelevance);
        assert!(err.to_string().contains("HTTP 503"));
    }
}
