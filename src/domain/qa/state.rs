//! Run state threaded through one pipeline invocation

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::NOT_RELATED_MESSAGE;
use super::label::RelevanceLabel;
use super::report::VerificationReport;
use crate::domain::retrieval::{Passage, Retriever};

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    CheckingRelevance,
    Research,
    Verify,
    Done,
}

/// Mutable state owned by the controller for the lifetime of one run.
///
/// Passages are fetched once at entry and never replaced; retries only
/// swap the draft and the report.
pub struct RunState {
    pub question: String,
    pub passages: Vec<Passage>,
    pub draft_answer: String,
    pub verification: Option<VerificationReport>,
    pub is_relevant: bool,
    pub relevance: RelevanceLabel,
    pub attempts: u32,
    pub stage: PipelineStage,
    pub retriever: Arc<dyn Retriever>,
}

impl RunState {
    pub fn new(
        question: impl Into<String>,
        passages: Vec<Passage>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        Self {
            question: question.into(),
            passages,
            draft_answer: String::new(),
            verification: None,
            is_relevant: false,
            relevance: RelevanceLabel::NoMatch,
            attempts: 0,
            stage: PipelineStage::CheckingRelevance,
            retriever,
        }
    }

    /// Move to `stage`, returning the stage that was left
    pub fn enter(&mut self, stage: PipelineStage) -> PipelineStage {
        let previous = std::mem::replace(&mut self.stage, stage);
        debug!(from = ?previous, to = ?stage, attempts = self.attempts, "Stage transition");
        previous
    }

    /// Replace the current draft; the previous report no longer applies
    pub fn set_draft(&mut self, draft: String) {
        self.draft_answer = draft;
        self.verification = None;
        self.attempts += 1;
    }

    pub fn into_result(self, verification_incomplete: bool) -> PipelineResult {
        let verification_report = self
            .verification
            .as_ref()
            .map(VerificationReport::format)
            .unwrap_or_default();

        PipelineResult {
            draft_answer: self.draft_answer,
            verification_report,
            report: self.verification,
            relevance: self.relevance,
            attempts: self.attempts,
            verification_incomplete,
        }
    }
}

impl fmt::Debug for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunState")
            .field("question", &self.question)
            .field("passages", &self.passages.len())
            .field("draft_answer", &self.draft_answer)
            .field("verification", &self.verification)
            .field("is_relevant", &self.is_relevant)
            .field("relevance", &self.relevance)
            .field("attempts", &self.attempts)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Terminal output of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Final draft answer, or the "not related" message
    pub draft_answer: String,
    /// Formatted verification report; empty when no verification ran
    pub verification_report: String,
    /// Structured form of the last verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<VerificationReport>,
    pub relevance: RelevanceLabel,
    /// Research executions performed
    pub attempts: u32,
    /// Verification still failed when the attempt cap was reached
    pub verification_incomplete: bool,
}

impl PipelineResult {
    /// Result for a question the documents do not cover
    pub fn not_related() -> Self {
        Self {
            draft_answer: NOT_RELATED_MESSAGE.to_string(),
            verification_report: String::new(),
            report: None,
            relevance: RelevanceLabel::NoMatch,
            attempts: 0,
            verification_incomplete: false,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.report
            .as_ref()
            .is_some_and(|report| !report.needs_revision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::qa::Verdict;
    use crate::domain::retrieval::MockRetriever;

    fn state() -> RunState {
        RunState::new(
            "What is the notice period?",
            vec![Passage::new("a#0", "Thirty days.")],
            Arc::new(MockRetriever::new()),
        )
    }

    #[test]
    fn test_new_state_starts_checking_relevance() {
        let state = state();

        assert_eq!(state.stage, PipelineStage::CheckingRelevance);
        assert_eq!(state.attempts, 0);
        assert!(!state.is_relevant);
        assert!(state.draft_answer.is_empty());
    }

    #[test]
    fn test_enter_records_transition() {
        let mut state = state();

        assert_eq!(state.enter(PipelineStage::Research), PipelineStage::CheckingRelevance);
        assert_eq!(state.enter(PipelineStage::Verify), PipelineStage::Research);
        assert_eq!(state.stage, PipelineStage::Verify);
    }

    #[test]
    fn test_set_draft_clears_report() {
        let mut state = state();
        state.verification = Some(VerificationReport::negative("old"));

        state.set_draft("New answer".to_string());

        assert_eq!(state.draft_answer, "New answer");
        assert!(state.verification.is_none());
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_into_result_formats_report() {
        let mut state = state();
        state.set_draft("Thirty days.".to_string());
        state.verification = Some(VerificationReport {
            supported: Verdict::Yes,
            relevant: Verdict::Yes,
            ..VerificationReport::default()
        });

        let result = state.into_result(false);

        assert_eq!(result.draft_answer, "Thirty days.");
        assert!(result.verification_report.starts_with("**Supported:** YES"));
        assert!(result.is_verified());
    }

    #[test]
    fn test_not_related_result() {
        let result = PipelineResult::not_related();

        assert_eq!(result.draft_answer, NOT_RELATED_MESSAGE);
        assert!(result.verification_report.is_empty());
        assert!(!result.is_verified());
    }
}
