//! Shared startup for the CLI commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::ingestion::fingerprint_set;
use crate::domain::retrieval::Retriever;
use crate::infrastructure::ingestion::{DocumentIndexer, load_documents};
use crate::infrastructure::llm::LlmProviderFactory;
use crate::infrastructure::observability::{
    PrometheusMetrics, init_metrics, init_tracing, shutdown_tracing,
};
use crate::infrastructure::qa::QaWorkflow;
use crate::infrastructure::retrieval::RetrieverRegistry;

/// Everything a command needs to answer questions
pub struct Session {
    pub id: String,
    pub config: AppConfig,
    pub workflow: QaWorkflow,
    pub registry: RetrieverRegistry,
    pub metrics: Option<PrometheusMetrics>,
    _telemetry: TelemetryGuard,
}

/// Flushes exported spans when dropped, so early returns through `?`
/// still shut the tracer provider down
struct TelemetryGuard {
    shutdown: Option<fn()>,
}

impl TelemetryGuard {
    fn new(tracing_enabled: bool) -> Self {
        Self {
            shutdown: tracing_enabled.then_some(shutdown_tracing as fn()),
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown();
        }
    }
}

impl Session {
    /// Load configuration, install logging and metrics, and wire the pipeline
    pub fn start(session_id: Option<String>, verbose: bool) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = AppConfig::load().context("Failed to load configuration")?;

        init_tracing(
            &config.logging.clone().verbose(verbose),
            &config.observability.tracing,
        );
        let metrics = init_metrics(&config.observability.metrics);

        let provider = LlmProviderFactory::create(&config.llm)?;
        let workflow = QaWorkflow::with_provider(provider, config.llm.model.clone(), config.qa_config());

        let id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(session = %id, model = %config.llm.model, "Session started");

        Ok(Self {
            id,
            _telemetry: TelemetryGuard::new(config.observability.tracing.enabled),
            config,
            workflow,
            registry: RetrieverRegistry::new(),
            metrics,
        })
    }

    /// Load the documents and return the session's retriever, rebuilding
    /// only when the document contents changed
    pub async fn index(&self, docs: &[PathBuf]) -> anyhow::Result<Arc<dyn Retriever>> {
        let documents = load_documents(docs).await?;
        let fingerprints = fingerprint_set(&documents);

        if !self.registry.needs_rebuild(&self.id, &fingerprints).await {
            info!(session = %self.id, "Documents unchanged, reusing index");
            return Ok(self.registry.get_required(&self.id).await?);
        }

        let indexer = DocumentIndexer::new(self.config.retrieval.chunking());
        let retriever: Arc<dyn Retriever> = Arc::new(indexer.build_keyword_retriever(&documents)?);

        self.registry
            .register(self.id.clone(), Arc::clone(&retriever), fingerprints)
            .await;

        Ok(retriever)
    }

    /// Prometheus exposition text, when metrics are enabled
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusMetrics::render)
    }
}
