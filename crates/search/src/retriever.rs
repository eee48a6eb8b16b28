//! The production retrieval pipeline: embed, then search.

use crate::qdrant::QdrantClient;
use async_trait::async_trait;
use codelore_core::error::RetrievalError;
use codelore_core::provider::{EmbeddingRequest, Provider};
use codelore_core::retrieval::{Retriever, Snippet};
use std::sync::Arc;
use tracing::debug;

/// Retrieves knowledge snippets from Qdrant, embedding the query text
/// through the provider's embedding endpoint first.
pub struct QdrantRetriever {
    client: QdrantClient,
    provider: Arc<dyn Provider>,
    embed_model: String,
    collection: String,
}

impl QdrantRetriever {
    pub fn new(
        client: QdrantClient,
        provider: Arc<dyn Provider>,
        embed_model: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider,
            embed_model: embed_model.into(),
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Snippet>, RetrievalError> {
        let embedding_response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embed_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        let vector = embedding_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                RetrievalError::EmbeddingFailed("Provider returned no embedding".into())
            })?;

        debug!(query, dims = vector.len(), "Query embedded");

        self.client.search(&self.collection, &vector, limit).await
    }
}
