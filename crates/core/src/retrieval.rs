//! Retriever trait — the abstraction over the external knowledge store.
//!
//! A Retriever turns a free-text query into an ordered sequence of content
//! snippets. The production implementation embeds the query and performs
//! vector similarity search; tests script the results directly.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single retrieved knowledge snippet, ordered by relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// The content-bearing payload text.
    pub content: String,

    /// Similarity score reported by the store.
    pub score: f32,
}

impl Snippet {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

/// The knowledge retrieval trait.
///
/// `retrieve` returns up to `limit` snippets ordered by descending
/// relevance. An empty result is valid — the store simply had nothing
/// close to the query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_serialization() {
        let s = Snippet::new("fn main() {}", 0.92);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("fn main"));
        let back: Snippet = serde_json::from_str(&json).unwrap();
        assert!((back.score - 0.92).abs() < f32::EPSILON);
    }
}
