//! Vector search for codelore.
//!
//! Two pieces:
//! - [`QdrantClient`] — a thin REST client for Qdrant's `points/search`.
//! - [`QdrantRetriever`] — the production [`Retriever`]: embeds the query
//!   text through the provider's `/embeddings` endpoint, then searches.
//!
//! The loop only ever sees the `Retriever` trait, so tests can script
//! retrieval without HTTP.

pub mod qdrant;
pub mod retriever;

pub use qdrant::QdrantClient;
pub use retriever::QdrantRetriever;
