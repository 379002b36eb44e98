//! LLM-backed answer verifier

use async_trait::async_trait;
use tracing::{debug, info};

use super::completion::StepModel;
use super::prompts::verify_prompt;
use crate::domain::qa::{AnswerVerifier, QaStep, StepError, VerificationReport};
use crate::domain::retrieval::{Passage, join_passages};

/// Checks a draft against the passages it was drafted from
#[derive(Debug, Clone)]
pub struct LlmAnswerVerifier {
    model: StepModel,
}

impl LlmAnswerVerifier {
    pub fn new(model: StepModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnswerVerifier for LlmAnswerVerifier {
    async fn verify(
        &self,
        answer: &str,
        passages: &[Passage],
    ) -> Result<VerificationReport, StepError> {
        let context = join_passages(passages, None);
        debug!(answer_chars = answer.len(), context_chars = context.len(), "Verifying answer");

        let prompt = verify_prompt(answer, &context);
        let response = self.model.complete(QaStep::Verify, prompt).await?;

        let report = VerificationReport::parse(response.as_deref().unwrap_or_default());

        info!(
            supported = %report.supported,
            relevant = %report.relevant,
            unsupported_claims = report.unsupported_claims.len(),
            contradictions = report.contradictions.len(),
            "Verification complete"
        );

        Ok(report)
    }
}
