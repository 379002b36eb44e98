//! Question answering domain
//!
//! Types and traits for the answering pipeline: relevance classification,
//! answer drafting, answer verification and the run state the controller
//! threads through them.

mod config;
mod error;
mod label;
mod report;
mod state;
mod steps;

pub use config::{ErrorPolicy, FALLBACK_ANSWER, NOT_RELATED_MESSAGE, QaConfig, StepSettings};
pub use error::{PipelineError, QaStep, StepError};
pub use label::RelevanceLabel;
pub use report::{
    AFFIRMATIVE, EMPTY_RESPONSE_NOTE, MODEL_FAILURE_NOTE, NEGATIVE, NONE_MARKER,
    PARSE_FAILURE_NOTE, Verdict, VerificationReport,
};
pub use state::{PipelineResult, PipelineStage, RunState};
pub use steps::{AnswerDrafter, AnswerVerifier, DraftAnswer, RelevanceChecker};

#[cfg(test)]
pub use steps::mock::{MockAnswerDrafter, MockAnswerVerifier, MockRelevanceChecker};
