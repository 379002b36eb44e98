//! QA workflow - the answering pipeline controller
//!
//! Sequences relevance classification, drafting and verification:
//!
//! ```text
//! CheckingRelevance --NO_MATCH--> Done ("not related")
//!        |
//!   CAN_ANSWER / PARTIAL
//!        v
//!    Research --> Verify --verified--> Done
//!        ^           |
//!        +--- NO ----+  (until the attempt cap)
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::completion::StepModel;
use super::{LlmAnswerDrafter, LlmAnswerVerifier, LlmRelevanceChecker};
use crate::domain::llm::LlmProvider;
use crate::domain::qa::{
    AnswerDrafter, AnswerVerifier, ErrorPolicy, FALLBACK_ANSWER, MODEL_FAILURE_NOTE,
    PipelineError, PipelineResult, PipelineStage, QaConfig, RelevanceChecker, RunState, StepError,
    VerificationReport,
};
use crate::domain::retrieval::{RetrievalQuery, Retriever};
use crate::infrastructure::observability::{record_pipeline_run, record_research_attempts};

/// Pipeline controller. Holds no per-run state, so one instance serves
/// concurrent runs.
pub struct QaWorkflow {
    relevance: Arc<dyn RelevanceChecker>,
    drafter: Arc<dyn AnswerDrafter>,
    verifier: Arc<dyn AnswerVerifier>,
    config: QaConfig,
}

impl QaWorkflow {
    pub fn new(
        relevance: Arc<dyn RelevanceChecker>,
        drafter: Arc<dyn AnswerDrafter>,
        verifier: Arc<dyn AnswerVerifier>,
        config: QaConfig,
    ) -> Self {
        Self {
            relevance,
            drafter,
            verifier,
            config,
        }
    }

    /// Wire the LLM-backed steps to one provider and model
    pub fn with_provider(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        config: QaConfig,
    ) -> Self {
        let model = model.into();

        let relevance = LlmRelevanceChecker::new(StepModel::new(
            Arc::clone(&provider),
            model.clone(),
            config.relevance,
        ));
        let drafter = LlmAnswerDrafter::new(StepModel::new(
            Arc::clone(&provider),
            model.clone(),
            config.draft,
        ));
        let verifier = LlmAnswerVerifier::new(StepModel::new(provider, model, config.verify));

        Self::new(
            Arc::new(relevance),
            Arc::new(drafter),
            Arc::new(verifier),
            config,
        )
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Answer one question over an already-built retriever
    pub async fn run_pipeline(
        &self,
        question: &str,
        retriever: Arc<dyn Retriever>,
    ) -> Result<PipelineResult, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::invalid_question("question is empty"));
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("qa_pipeline", %run_id);

        let result = self.execute(question, retriever).instrument(span).await;

        match &result {
            Ok(output) => {
                record_research_attempts(output.attempts);
                record_pipeline_run(outcome_label(output));
            }
            Err(_) => record_pipeline_run("error"),
        }

        result
    }

    async fn execute(
        &self,
        question: &str,
        retriever: Arc<dyn Retriever>,
    ) -> Result<PipelineResult, PipelineError> {
        let query = RetrievalQuery::new(question).with_top_k(self.config.retrieval_top_k);
        let passages = retriever
            .retrieve(&query)
            .await
            .map_err(|e| PipelineError::retrieval(e.to_string()))?;

        info!(passages = passages.len(), "Starting pipeline");

        let mut state = RunState::new(question, passages, retriever);

        state.relevance = self
            .relevance
            .classify(
                &state.question,
                state.retriever.as_ref(),
                self.config.relevance_top_k,
            )
            .await;
        state.is_relevant = state.relevance.should_proceed();

        if !state.is_relevant {
            info!("Question not covered by the documents");
            state.enter(PipelineStage::Done);
            return Ok(PipelineResult::not_related());
        }

        let cap = self.config.attempt_cap();

        loop {
            state.enter(PipelineStage::Research);
            let draft = self.research(&state).await?;
            state.set_draft(draft);

            state.enter(PipelineStage::Verify);
            let report = self.verify(&state).await?;
            let needs_revision = report.needs_revision();
            state.verification = Some(report);

            if !needs_revision {
                info!(attempts = state.attempts, "Answer verified");
                state.enter(PipelineStage::Done);
                return Ok(state.into_result(false));
            }

            if state.attempts >= cap {
                warn!(attempts = state.attempts, "Verification still failing at attempt cap");
                state.enter(PipelineStage::Done);
                return Ok(state.into_result(true));
            }

            info!(attempt = state.attempts, "Verification failed, drafting again");
        }
    }

    async fn research(&self, state: &RunState) -> Result<String, PipelineError> {
        match self.drafter.draft(&state.question, &state.passages).await {
            Ok(draft) => Ok(draft.draft_answer),
            Err(e) => self
                .on_step_error(e)
                .map(|()| FALLBACK_ANSWER.to_string()),
        }
    }

    async fn verify(&self, state: &RunState) -> Result<VerificationReport, PipelineError> {
        match self
            .verifier
            .verify(&state.draft_answer, &state.passages)
            .await
        {
            Ok(report) => Ok(report),
            Err(e) => self
                .on_step_error(e)
                .map(|()| VerificationReport::negative(MODEL_FAILURE_NOTE)),
        }
    }

    /// `Ok` when the policy says to substitute the step default
    fn on_step_error(&self, error: StepError) -> Result<(), PipelineError> {
        match self.config.error_policy {
            ErrorPolicy::Degrade => {
                warn!(step = %error.step(), error = %error, "Step failed, using default");
                Ok(())
            }
            ErrorPolicy::Abort => Err(error.into()),
        }
    }
}

fn outcome_label(result: &PipelineResult) -> &'static str {
    if result.attempts == 0 {
        "not_related"
    } else if result.verification_incomplete {
        "incomplete"
    } else {
        "verified"
    }
}

impl fmt::Debug for QaWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaWorkflow")
            .field("relevance", &self.relevance)
            .field("drafter", &self.drafter)
            .field("verifier", &self.verifier)
            .field("config", &self.config)
            .finish()
    }
}
