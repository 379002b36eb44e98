//! LLM-backed answer drafter

use async_trait::async_trait;
use tracing::{debug, warn};

use super::completion::StepModel;
use super::prompts::draft_prompt;
use crate::domain::qa::{AnswerDrafter, DraftAnswer, FALLBACK_ANSWER, QaStep, StepError};
use crate::domain::retrieval::{Passage, join_passages};

/// Drafts an answer grounded in every passage handed in
#[derive(Debug, Clone)]
pub struct LlmAnswerDrafter {
    model: StepModel,
}

impl LlmAnswerDrafter {
    pub fn new(model: StepModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnswerDrafter for LlmAnswerDrafter {
    async fn draft(&self, question: &str, passages: &[Passage]) -> Result<DraftAnswer, StepError> {
        let context = join_passages(passages, None);
        debug!(context_chars = context.len(), passages = passages.len(), "Drafting answer");

        let prompt = draft_prompt(question, &context);

        let draft_answer = match self.model.complete(QaStep::Research, prompt).await? {
            Some(answer) => answer,
            None => {
                warn!("Model returned no draft, using fallback answer");
                FALLBACK_ANSWER.to_string()
            }
        };

        Ok(DraftAnswer::new(draft_answer, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::qa::StepSettings;
    use std::sync::Arc;

    fn drafter(provider: Arc<MockLlmProvider>) -> LlmAnswerDrafter {
        LlmAnswerDrafter::new(StepModel::new(provider, "m", StepSettings::new(0.3, 300)))
    }

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("a#0", "Rent is due on the first."),
            Passage::new("a#1", "Late fees apply after five days."),
        ]
    }

    #[tokio::test]
    async fn test_draft_uses_all_passages() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("  On the first.  "));

        let draft = drafter(provider.clone())
            .draft("When is rent due?", &passages())
            .await
            .unwrap();

        assert_eq!(draft.draft_answer, "On the first.");
        assert_eq!(
            draft.context_used,
            "Rent is due on the first.\n\nLate fees apply after five days."
        );

        let requests = provider.requests();
        let prompt = requests[0].last_user_content().unwrap();
        assert!(prompt.contains("When is rent due?"));
        assert!(prompt.contains("Late fees apply after five days."));
    }

    #[tokio::test]
    async fn test_empty_output_becomes_fallback() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(" \n "));

        let draft = drafter(provider).draft("q", &passages()).await.unwrap();

        assert_eq!(draft.draft_answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_invocation_error_propagates() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_error("HTTP 401"));

        let err = drafter(provider).draft("q", &passages()).await.unwrap_err();

        assert_eq!(err.step(), QaStep::Research);
        assert!(matches!(err, StepError::ModelInvocation { .. }));
    }
}
