//! # codelore Core
//!
//! Domain types, traits, and error definitions for the codelore retrieval
//! loop. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (chat completion, embedding, vector search,
//! tokenization) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted fakes
//! - Clean dependency graph (all crates depend inward on core)

pub mod codec;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use codec::TokenCodec;
pub use error::{Error, Result};
pub use event::{EventBus, LoopEvent};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{Retriever, Snippet};
