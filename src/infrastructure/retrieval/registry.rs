//! Session registry - maps a session to the retriever built for its documents

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::retrieval::Retriever;

struct RegistryEntry {
    retriever: Arc<dyn Retriever>,
    fingerprints: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Snapshot of one registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registry of per-session retrievers.
///
/// Entries live until removed; nothing expires on its own.
pub struct RetrieverRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl Default for RetrieverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrieverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a retriever for a session, replacing any previous one
    pub async fn register(
        &self,
        session_id: impl Into<String>,
        retriever: Arc<dyn Retriever>,
        fingerprints: BTreeSet<String>,
    ) {
        let session_id = session_id.into();
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let created_at = entries
            .get(&session_id)
            .map(|entry| entry.created_at)
            .unwrap_or(now);

        entries.insert(
            session_id,
            RegistryEntry {
                retriever,
                fingerprints,
                created_at,
                updated_at: now,
            },
        );
    }

    /// True when no retriever exists for the session or its documents changed
    pub async fn needs_rebuild(&self, session_id: &str, fingerprints: &BTreeSet<String>) -> bool {
        match self.entries.read().await.get(session_id) {
            Some(entry) => &entry.fingerprints != fingerprints,
            None => true,
        }
    }

    /// Get the retriever for a session
    pub async fn get(&self, session_id: &str) -> Option<Arc<dyn Retriever>> {
        self.entries
            .read()
            .await
            .get(session_id)
            .map(|entry| Arc::clone(&entry.retriever))
    }

    /// Get the retriever for a session, returning error if not found
    pub async fn get_required(&self, session_id: &str) -> Result<Arc<dyn Retriever>, DomainError> {
        self.get(session_id).await.ok_or_else(|| {
            DomainError::not_found(format!(
                "No retriever registered for session '{}'",
                session_id
            ))
        })
    }

    pub async fn info(&self, session_id: &str) -> Option<SessionInfo> {
        self.entries
            .read()
            .await
            .get(session_id)
            .map(|entry| SessionInfo {
                session_id: session_id.to_string(),
                document_count: entry.fingerprints.len(),
                created_at: entry.created_at,
                updated_at: entry.updated_at,
            })
    }

    /// Remove a session from the registry
    pub async fn remove(&self, session_id: &str) -> Option<Arc<dyn Retriever>> {
        self.entries
            .write()
            .await
            .remove(session_id)
            .map(|entry| entry.retriever)
    }

    /// List all registered sessions, sorted
    pub async fn list_sessions(&self) -> Vec<String> {
        let mut sessions: Vec<String> = self.entries.read().await.keys().cloned().collect();
        sessions.sort();
        sessions
    }

    /// Get session count
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl fmt::Debug for RetrieverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieverRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::Passage;
    use crate::infrastructure::retrieval::KeywordRetriever;

    fn retriever() -> Arc<dyn Retriever> {
        Arc::new(KeywordRetriever::new(vec![Passage::new("a#0", "alpha")]))
    }

    fn prints(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = RetrieverRegistry::new();
        registry.register("s1", retriever(), prints(&["f1"])).await;

        let retrieved = registry.get("s1").await;
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().retriever_name(), "keyword");
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_get_required_not_found() {
        let registry = RetrieverRegistry::new();

        let result = registry.get_required("missing").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_needs_rebuild_tracks_fingerprints() {
        let registry = RetrieverRegistry::new();
        assert!(registry.needs_rebuild("s1", &prints(&["f1"])).await);

        registry.register("s1", retriever(), prints(&["f1", "f2"])).await;

        assert!(!registry.needs_rebuild("s1", &prints(&["f2", "f1"])).await);
        assert!(registry.needs_rebuild("s1", &prints(&["f1"])).await);
        assert!(registry.needs_rebuild("s2", &prints(&["f1", "f2"])).await);
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let registry = RetrieverRegistry::new();
        registry.register("s1", retriever(), prints(&["f1"])).await;
        let first = registry.info("s1").await.unwrap();

        registry.register("s1", retriever(), prints(&["f1", "f2"])).await;
        let second = registry.info("s1").await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.document_count, 2);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_and_list() {
        let registry = RetrieverRegistry::new();
        registry.register("b", retriever(), prints(&[])).await;
        registry.register("a", retriever(), prints(&[])).await;

        assert_eq!(registry.list_sessions().await, vec!["a", "b"]);

        assert!(registry.remove("a").await.is_some());
        assert!(registry.remove("a").await.is_none());
        assert_eq!(registry.list_sessions().await, vec!["b"]);
    }
}
