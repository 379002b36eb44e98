//! Domain layer - Core entities and the capability traits the pipeline consumes

pub mod error;
pub mod ingestion;
pub mod llm;
pub mod qa;
pub mod retrieval;

pub use error::DomainError;
pub use ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, SourceDocument};
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use qa::{
    AnswerDrafter, AnswerVerifier, DraftAnswer, ErrorPolicy, PipelineError, PipelineResult,
    QaConfig, QaStep, RelevanceChecker, RelevanceLabel, StepError, Verdict, VerificationReport,
};
pub use retrieval::{Passage, RetrievalQuery, Retriever};
