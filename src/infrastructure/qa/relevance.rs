//! LLM-backed relevance checker

use async_trait::async_trait;
use tracing::{debug, info};

use super::completion::StepModel;
use super::prompts::relevance_prompt;
use crate::domain::qa::{QaStep, RelevanceChecker, RelevanceLabel, StepError};
use crate::domain::retrieval::{RetrievalQuery, Retriever, join_passages};

/// Asks the model to label how well the top passages cover a question
#[derive(Debug, Clone)]
pub struct LlmRelevanceChecker {
    model: StepModel,
}

impl LlmRelevanceChecker {
    pub fn new(model: StepModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl RelevanceChecker for LlmRelevanceChecker {
    async fn check(
        &self,
        question: &str,
        retriever: &dyn Retriever,
        top_k: usize,
    ) -> Result<RelevanceLabel, StepError> {
        let query = RetrievalQuery::new(question).with_top_k(top_k);
        let passages = retriever
            .retrieve(&query)
            .await
            .map_err(|e| StepError::retrieval(QaStep::CheckRelevance, e.to_string()))?;

        if passages.is_empty() {
            debug!("No passages retrieved, skipping model call");
            return Ok(RelevanceLabel::NoMatch);
        }

        let context = join_passages(&passages, Some(top_k));
        let prompt = relevance_prompt(question, &context);

        let label = match self.model.complete(QaStep::CheckRelevance, prompt).await? {
            Some(raw) => RelevanceLabel::parse_strict(&raw),
            None => RelevanceLabel::NoMatch,
        };

        info!(label = %label, passages = passages.len().min(top_k), "Relevance classified");

        Ok(label)
    }
}
