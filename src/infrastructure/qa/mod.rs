//! LLM-backed answering steps and the pipeline controller

mod completion;
mod drafter;
mod prompts;
mod relevance;
mod verifier;
mod workflow;

pub use completion::StepModel;
pub use drafter::LlmAnswerDrafter;
pub use relevance::LlmRelevanceChecker;
pub use verifier::LlmAnswerVerifier;
pub use workflow::QaWorkflow;
