//! QA step and pipeline error types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline step names, used for error tagging, logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaStep {
    Retrieve,
    CheckRelevance,
    Research,
    Verify,
}

impl QaStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::CheckRelevance => "check_relevance",
            Self::Research => "research",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for QaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure returned by a step component.
///
/// Malformed model output is never a `StepError`; components recover it
/// locally. Only failures of a collaborator call end up here.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StepError {
    #[error("Model call failed in '{step}': {message}")]
    ModelInvocation { step: QaStep, message: String },

    #[error("Retrieval failed in '{step}': {message}")]
    Retrieval { step: QaStep, message: String },
}

impl StepError {
    pub fn model_invocation(step: QaStep, message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            step,
            message: message.into(),
        }
    }

    pub fn retrieval(step: QaStep, message: impl Into<String>) -> Self {
        Self::Retrieval {
            step,
            message: message.into(),
        }
    }

    pub fn step(&self) -> QaStep {
        match self {
            Self::ModelInvocation { step, .. } | Self::Retrieval { step, .. } => *step,
        }
    }
}

/// Errors that abort a single pipeline run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Passage retrieval failed: {0}")]
    Retrieval(String),

    #[error(transparent)]
    Step(#[from] StepError),
}

impl PipelineError {
    pub fn invalid_question(message: impl Into<String>) -> Self {
        Self::InvalidQuestion(message.into())
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StepError::model_invocation(QaStep::Research, "HTTP 500");
        assert_eq!(err.to_string(), "Model call failed in 'research': HTTP 500");
        assert_eq!(err.step(), QaStep::Research);

        let err = PipelineError::from(StepError::retrieval(QaStep::CheckRelevance, "timeout"));
        assert_eq!(
            err.to_string(),
            "Retrieval failed in 'check_relevance': timeout"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = PipelineError::invalid_question("empty");
        let err2 = PipelineError::invalid_question("empty");
        assert_eq!(err1, err2);
        assert_ne!(err1, PipelineError::retrieval("empty"));
    }
}
