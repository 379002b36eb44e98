//! Retrieval implementations

mod ensemble;
mod keyword;
mod registry;

pub use ensemble::{DEFAULT_WEIGHTS, EnsembleRetriever, RRF_CONSTANT};
pub use keyword::{KeywordRetriever, tokenize};
pub use registry::{RetrieverRegistry, SessionInfo};
