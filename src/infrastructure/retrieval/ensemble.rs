//! Weighted reciprocal-rank fusion over several retrievers
//!
//! The CLI indexes with a single keyword retriever. Library callers that
//! bring their own semantic retriever combine the two here.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::warn;

use crate::domain::DomainError;
use crate::domain::retrieval::{Passage, RetrievalQuery, Retriever};

/// Rank offset in the fusion formula
pub const RRF_CONSTANT: f32 = 60.0;

/// Lexical, semantic
pub const DEFAULT_WEIGHTS: [f32; 2] = [0.4, 0.6];

/// Combines child retrievers: `score = Σ weight / (rank + 60)`, rank starting at 1.
///
/// Passages with identical content are merged.
pub struct EnsembleRetriever {
    children: Vec<(Arc<dyn Retriever>, f32)>,
}

impl EnsembleRetriever {
    pub fn new(retrievers: Vec<Arc<dyn Retriever>>, weights: Vec<f32>) -> Result<Self, DomainError> {
        if retrievers.is_empty() {
            return Err(DomainError::validation(
                "Ensemble needs at least one retriever",
            ));
        }

        if retrievers.len() != weights.len() {
            return Err(DomainError::validation(format!(
                "Ensemble has {} retrievers but {} weights",
                retrievers.len(),
                weights.len()
            )));
        }

        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DomainError::validation(
                "Ensemble weights must be finite and non-negative",
            ));
        }

        Ok(Self {
            children: retrievers.into_iter().zip(weights).collect(),
        })
    }

    pub fn weights(&self) -> Vec<f32> {
        self.children.iter().map(|(_, w)| *w).collect()
    }

    fn fuse(&self, ranked_lists: Vec<(Vec<Passage>, f32)>, top_k: usize) -> Vec<Passage> {
        let mut order: Vec<Passage> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut scores: Vec<f32> = Vec::new();

        for (passages, weight) in ranked_lists {
            for (rank, passage) in passages.into_iter().enumerate() {
                let contribution = weight / (rank as f32 + 1.0 + RRF_CONSTANT);

                match positions.get(&passage.content) {
                    Some(&pos) => scores[pos] += contribution,
                    None => {
                        positions.insert(passage.content.clone(), order.len());
                        order.push(passage);
                        scores.push(contribution);
                    }
                }
            }
        }

        let mut fused: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        fused.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        fused
            .into_iter()
            .take(top_k)
            .map(|(i, score)| order[i].clone().with_score(score))
            .collect()
    }
}

impl fmt::Debug for EnsembleRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnsembleRetriever")
            .field("children", &self.children.len())
            .field("weights", &self.weights())
            .finish()
    }
}

#[async_trait]
impl Retriever for EnsembleRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>, DomainError> {
        let results = join_all(
            self.children
                .iter()
                .map(|(retriever, _)| retriever.retrieve(query)),
        )
        .await;

        let mut ranked_lists = Vec::with_capacity(results.len());
        let mut last_error = None;

        for (child, (result, (_, weight))) in results.into_iter().zip(&self.children).enumerate() {
            match result {
                Ok(passages) => ranked_lists.push((passages, *weight)),
                Err(e) => {
                    warn!(child, error = %e, "Ensemble child retriever failed, skipping");
                    last_error = Some(e);
                }
            }
        }

        if ranked_lists.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(self.fuse(ranked_lists, query.top_k))
    }

    fn retriever_name(&self) -> &'static str {
        "ensemble"
    }
}
