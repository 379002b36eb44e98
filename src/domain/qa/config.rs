//! QA pipeline configuration types

use serde::{Deserialize, Serialize};

/// Answer returned when the documents do not cover the question
pub const NOT_RELATED_MESSAGE: &str = "This question is not related to (or there is no data for) your query. Please ask another question relevant to the uploaded document(s).";

/// Draft substituted when the model gives back nothing usable
pub const FALLBACK_ANSWER: &str = "I cannot answer this question based on the provided documents.";

/// What the controller does when a draft or verify model call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Substitute the step's conservative default and carry on
    #[default]
    Degrade,
    /// Abort the run and surface the step error to the caller
    Abort,
}

/// Sampling settings for one model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StepSettings {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: temperature.clamp(0.0, 2.0),
            max_tokens,
        }
    }
}

/// Configuration for a QA pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    /// Number of top passages the relevance check looks at
    #[serde(default = "default_relevance_top_k")]
    pub relevance_top_k: usize,
    /// Passages fetched at pipeline entry
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    /// Maximum number of research (draft) executions per run
    #[serde(default = "default_max_research_attempts")]
    pub max_research_attempts: u32,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default = "default_relevance_settings")]
    pub relevance: StepSettings,
    #[serde(default = "default_draft_settings")]
    pub draft: StepSettings,
    #[serde(default = "default_verify_settings")]
    pub verify: StepSettings,
}

fn default_relevance_top_k() -> usize {
    20
}

fn default_retrieval_top_k() -> usize {
    10
}

fn default_max_research_attempts() -> u32 {
    3
}

fn default_relevance_settings() -> StepSettings {
    StepSettings::new(0.0, 10)
}

fn default_draft_settings() -> StepSettings {
    StepSettings::new(0.3, 300)
}

fn default_verify_settings() -> StepSettings {
    StepSettings::new(0.0, 200)
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            relevance_top_k: default_relevance_top_k(),
            retrieval_top_k: default_retrieval_top_k(),
            max_research_attempts: default_max_research_attempts(),
            error_policy: ErrorPolicy::default(),
            relevance: default_relevance_settings(),
            draft: default_draft_settings(),
            verify: default_verify_settings(),
        }
    }
}

impl QaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the research attempt cap; at least one attempt always runs
    pub fn with_max_research_attempts(mut self, attempts: u32) -> Self {
        self.max_research_attempts = attempts.max(1);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_relevance_top_k(mut self, top_k: usize) -> Self {
        self.relevance_top_k = top_k;
        self
    }

    pub fn with_retrieval_top_k(mut self, top_k: usize) -> Self {
        self.retrieval_top_k = top_k;
        self
    }

    /// Effective attempt cap, never below one
    pub fn attempt_cap(&self) -> u32 {
        self.max_research_attempts.max(1)
    }
}
