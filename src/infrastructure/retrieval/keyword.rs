//! In-memory BM25 keyword retriever

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;
use crate::domain::retrieval::{Passage, RetrievalQuery, Retriever};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Term frequency saturation
const K1: f32 = 1.5;
/// Document length normalization
const B: f32 = 0.75;

/// Lower-cased alphanumeric words of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug)]
struct IndexedPassage {
    passage: Passage,
    term_freqs: HashMap<String, u32>,
    length: f32,
}

/// Okapi BM25 over a fixed set of passages.
///
/// The index is built once and only read afterwards.
#[derive(Debug)]
pub struct KeywordRetriever {
    docs: Vec<IndexedPassage>,
    doc_freqs: HashMap<String, u32>,
    avg_length: f32,
}

impl KeywordRetriever {
    pub fn new(passages: Vec<Passage>) -> Self {
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_length = 0usize;

        let docs: Vec<IndexedPassage> = passages
            .into_iter()
            .map(|passage| {
                let tokens = tokenize(&passage.content);
                total_length += tokens.len();

                let mut term_freqs: HashMap<String, u32> = HashMap::new();
                for token in tokens.iter() {
                    *term_freqs.entry(token.clone()).or_insert(0) += 1;
                }
                for term in term_freqs.keys() {
                    *doc_freqs.entry(term.clone()).or_insert(0) += 1;
                }

                IndexedPassage {
                    passage,
                    term_freqs,
                    length: tokens.len() as f32,
                }
            })
            .collect();

        let avg_length = if docs.is_empty() {
            0.0
        } else {
            total_length as f32 / docs.len() as f32
        };

        Self {
            docs,
            doc_freqs,
            avg_length,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.docs.len() as f32;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, doc: &IndexedPassage, query_terms: &[String]) -> f32 {
        let norm = if self.avg_length > 0.0 {
            1.0 - B + B * doc.length / self.avg_length
        } else {
            1.0
        };

        query_terms
            .iter()
            .filter_map(|term| {
                let tf = *doc.term_freqs.get(term)? as f32;
                Some(self.idf(term) * tf * (K1 + 1.0) / (tf + K1 * norm))
            })
            .sum()
    }

    /// Rank passages for `text`, best first; ties keep index order
    pub fn search(&self, text: &str, top_k: usize) -> Vec<Passage> {
        let query_terms = tokenize(text);
        if query_terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, self.score(doc, &query_terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| self.docs[i].passage.clone().with_score(score))
            .collect()
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>, DomainError> {
        Ok(self.search(&query.text, query.top_k))
    }

    fn retriever_name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> KeywordRetriever {
        KeywordRetriever::new(vec![
            Passage::new("lease#0", "The tenant must give sixty days notice before leaving."),
            Passage::new("lease#1", "Rent is due on the first day of each month."),
            Passage::new("lease#2", "Pets are not allowed without written consent."),
        ])
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Hello, World! 42 times"),
            vec!["hello", "world", "42", "times"]
        );
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_best_match_first() {
        let retriever = corpus();

        let results = retriever.search("When is rent due?", 3);

        assert!(!results.is_empty());
        assert_eq!(results[0].id, "lease#1");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_no_overlap_returns_nothing() {
        let retriever = corpus();
        assert!(retriever.search("quantum chromodynamics", 5).is_empty());
    }

    #[test]
    fn test_top_k_limits_results() {
        let retriever = corpus();
        let results = retriever.search("the", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_empty_index() {
        let retriever = KeywordRetriever::new(Vec::new());
        assert!(retriever.is_empty());
        assert!(retriever.search("anything", 10).is_empty());
    }

    #[test]
    fn test_scores_descend() {
        let retriever = corpus();
        let results = retriever.search("notice days month written", 3);

        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_retrieve_honors_query_top_k() {
        let retriever = corpus();
        let query = RetrievalQuery::new("the tenant rent pets").with_top_k(2);

        let results = retriever.retrieve(&query).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
