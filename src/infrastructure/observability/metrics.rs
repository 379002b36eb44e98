//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

pub const LLM_REQUESTS_TOTAL: &str = "docqa_llm_requests_total";
pub const LLM_REQUEST_DURATION: &str = "docqa_llm_request_duration_seconds";
pub const PIPELINE_RUNS_TOTAL: &str = "docqa_pipeline_runs_total";
pub const PIPELINE_RESEARCH_ATTEMPTS: &str = "docqa_pipeline_research_attempts";

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Render metrics in the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();
            tracing::debug!("Prometheus metrics recorder installed");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("docqa_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one model call made by a pipeline step
pub fn record_llm_call(step: &'static str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };

    counter!(LLM_REQUESTS_TOTAL, "step" => step, "status" => status).increment(1);
    histogram!(LLM_REQUEST_DURATION, "step" => step).record(duration.as_secs_f64());
}

/// Record the terminal outcome of a pipeline run
pub fn record_pipeline_run(outcome: &'static str) {
    counter!(PIPELINE_RUNS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record how many research attempts a run needed
pub fn record_research_attempts(attempts: u32) {
    histogram!(PIPELINE_RESEARCH_ATTEMPTS).record(f64::from(attempts));
}
