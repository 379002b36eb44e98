//! Step traits for the answering pipeline
//!
//! Each step owns one model call. Components recover malformed model output
//! with their documented default and return `StepError` only when a
//! collaborator call fails; the controller decides what that failure means.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::warn;

use super::error::StepError;
use super::label::RelevanceLabel;
use super::report::VerificationReport;
use crate::domain::retrieval::{Passage, Retriever};

/// A drafted answer together with the context it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftAnswer {
    pub draft_answer: String,
    pub context_used: String,
}

impl DraftAnswer {
    pub fn new(draft_answer: impl Into<String>, context_used: impl Into<String>) -> Self {
        Self {
            draft_answer: draft_answer.into(),
            context_used: context_used.into(),
        }
    }
}

/// Labels how well the retrievable passages cover a question
#[async_trait]
pub trait RelevanceChecker: Send + Sync + Debug {
    /// Classify coverage using the first `top_k` passages the retriever returns
    async fn check(
        &self,
        question: &str,
        retriever: &dyn Retriever,
        top_k: usize,
    ) -> Result<RelevanceLabel, StepError>;

    /// Fail-closed classification: any step error becomes `NO_MATCH`
    async fn classify(
        &self,
        question: &str,
        retriever: &dyn Retriever,
        top_k: usize,
    ) -> RelevanceLabel {
        match self.check(question, retriever, top_k).await {
            Ok(label) => label,
            Err(e) => {
                warn!(error = %e, "Relevance check failed, treating as NO_MATCH");
                RelevanceLabel::NoMatch
            }
        }
    }
}

/// Produces a draft answer grounded only in the supplied passages
#[async_trait]
pub trait AnswerDrafter: Send + Sync + Debug {
    async fn draft(&self, question: &str, passages: &[Passage]) -> Result<DraftAnswer, StepError>;
}

/// Checks a draft answer against the same passages it was drafted from
#[async_trait]
pub trait AnswerVerifier: Send + Sync + Debug {
    async fn verify(
        &self,
        answer: &str,
        passages: &[Passage],
    ) -> Result<VerificationReport, StepError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::qa::QaStep;
    use crate::domain::retrieval::join_passages;

    /// Relevance checker returning a fixed label
    #[derive(Debug)]
    pub struct MockRelevanceChecker {
        label: RelevanceLabel,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockRelevanceChecker {
        pub fn new(label: RelevanceLabel) -> Self {
            Self {
                label,
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RelevanceChecker for MockRelevanceChecker {
        async fn check(
            &self,
            _question: &str,
            _retriever: &dyn Retriever,
            _top_k: usize,
        ) -> Result<RelevanceLabel, StepError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            match self.error {
                Some(ref error) => Err(StepError::model_invocation(QaStep::CheckRelevance, error)),
                None => Ok(self.label),
            }
        }
    }

    /// Drafter replaying queued answers; the last one repeats
    #[derive(Debug)]
    pub struct MockAnswerDrafter {
        answers: Mutex<VecDeque<String>>,
        last: Mutex<Option<String>>,
        error: Option<String>,
        questions: Mutex<Vec<String>>,
    }

    impl MockAnswerDrafter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
                last: Mutex::new(None),
                error: None,
                questions: Mutex::new(Vec::new()),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.questions.lock().unwrap().len()
        }

        pub fn questions(&self) -> Vec<String> {
            self.questions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerDrafter for MockAnswerDrafter {
        async fn draft(
            &self,
            question: &str,
            passages: &[Passage],
        ) -> Result<DraftAnswer, StepError> {
            self.questions.lock().unwrap().push(question.to_string());

            if let Some(ref error) = self.error {
                return Err(StepError::model_invocation(QaStep::Research, error));
            }

            let mut last = self.last.lock().unwrap();
            let answer = match self.answers.lock().unwrap().pop_front() {
                Some(answer) => answer,
                None => last.clone().unwrap_or_default(),
            };
            *last = Some(answer.clone());

            Ok(DraftAnswer::new(answer, join_passages(passages, None)))
        }
    }

    /// Verifier replaying queued reports; the last one repeats
    #[derive(Debug)]
    pub struct MockAnswerVerifier {
        reports: Mutex<VecDeque<VerificationReport>>,
        last: Mutex<Option<VerificationReport>>,
        error: Option<String>,
        answers: Mutex<Vec<String>>,
    }

    impl MockAnswerVerifier {
        pub fn new<I>(reports: I) -> Self
        where
            I: IntoIterator<Item = VerificationReport>,
        {
            Self {
                reports: Mutex::new(reports.into_iter().collect()),
                last: Mutex::new(None),
                error: None,
                answers: Mutex::new(Vec::new()),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.answers.lock().unwrap().len()
        }

        /// Answers that were handed in for verification, in call order
        pub fn answers(&self) -> Vec<String> {
            self.answers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerVerifier for MockAnswerVerifier {
        async fn verify(
            &self,
            answer: &str,
            _passages: &[Passage],
        ) -> Result<VerificationReport, StepError> {
            self.answers.lock().unwrap().push(answer.to_string());

            if let Some(ref error) = self.error {
                return Err(StepError::model_invocation(QaStep::Verify, error));
            }

            let mut last = self.last.lock().unwrap();
            let report = match self.reports.lock().unwrap().pop_front() {
                Some(report) => report,
                None => last.clone().unwrap_or_default(),
            };
            *last = Some(report.clone());

            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRelevanceChecker;
    use super::*;
    use crate::domain::retrieval::MockRetriever;

    #[tokio::test]
    async fn test_classify_fails_closed() {
        let checker = MockRelevanceChecker::new(RelevanceLabel::CanAnswer).with_error("timeout");
        let retriever = MockRetriever::new();

        let label = checker.classify("q", &retriever, 20).await;

        assert_eq!(label, RelevanceLabel::NoMatch);
        assert_eq!(checker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_classify_passes_label_through() {
        let checker = MockRelevanceChecker::new(RelevanceLabel::Partial);
        let retriever = MockRetriever::new();

        assert_eq!(
            checker.classify("q", &retriever, 20).await,
            RelevanceLabel::Partial
        );
    }
}
