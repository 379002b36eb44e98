//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use self::metrics::{
    LLM_REQUEST_DURATION, LLM_REQUESTS_TOTAL, PIPELINE_RESEARCH_ATTEMPTS, PIPELINE_RUNS_TOTAL,
    PrometheusMetrics, init_metrics, record_llm_call, record_pipeline_run,
    record_research_attempts,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
