//! Qdrant REST client.
//!
//! Covers the single operation this system needs: vector similarity search
//! over one collection, returning the `content` field of each point's
//! payload together with its score.

use codelore_core::error::RetrievalError;
use codelore_core::retrieval::Snippet;
use serde::Deserialize;
use tracing::{debug, warn};

/// A thin client for a Qdrant instance.
pub struct QdrantClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl QdrantClient {
    /// Create a new client. `api_key` is optional for local instances.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    /// Search `collection` for the `limit` nearest points to `vector`.
    ///
    /// Returns snippets ordered as Qdrant returned them (descending score).
    /// Points whose payload carries no `content` field yield an empty
    /// snippet rather than being dropped, preserving result ordering.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<Snippet>, RetrievalError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, collection
        );

        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        debug!(collection, limit, dims = vector.len(), "Searching Qdrant");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 404 {
            return Err(RetrievalError::CollectionNotFound(collection.to_string()));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Qdrant returned error");
            return Err(RetrievalError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: SearchResponse =
            response.json().await.map_err(|e| RetrievalError::ApiError {
                status_code: 200,
                message: format!("Failed to parse search response: {e}"),
            })?;

        let snippets = api_resp
            .result
            .into_iter()
            .map(|point| {
                let content = point.payload.content.unwrap_or_default();
                Snippet::new(content, point.score)
            })
            .collect();

        Ok(snippets)
    }
}

// --- Qdrant API types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Payload,
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    content: Option<String>,
}
