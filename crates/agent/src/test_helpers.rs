//! Shared test helpers for loop tests.

use async_trait::async_trait;
use codelore_core::codec::TokenCodec;
use codelore_core::error::{CodecError, ProviderError, RetrievalError};
use codelore_core::message::Message;
use codelore_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use codelore_core::retrieval::{Retriever, Snippet};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided — an extra call
/// is a test failure, not something to paper over.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The user-message content of the i-th completion request.
    pub fn prompt(&self, i: usize) -> String {
        let requests = self.requests.lock().unwrap();
        requests[i]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if requests.len() >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                requests.len() + 1,
                responses.len()
            );
        }

        let response = responses[requests.len()].clone();
        requests.push(request);

        Ok(ProviderResponse {
            message: Message::assistant(response),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A provider whose completion always fails, for propagation tests.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// A retriever that returns fixed snippets and records every call.
pub struct ScriptedRetriever {
    snippets: Vec<Snippet>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedRetriever {
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<Snippet>, RetrievalError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        Ok(self.snippets.clone())
    }
}

/// A retriever whose search always fails.
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(&self, _query: &str, _limit: usize) -> Result<Vec<Snippet>, RetrievalError> {
        Err(RetrievalError::Network("search unreachable".into()))
    }
}

/// One token per character. Deterministic and multi-byte safe, which makes
/// truncation boundaries exact in tests.
pub struct CharCodec;

impl TokenCodec for CharCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>, CodecError> {
        Ok(text.chars().map(|c| c as u32).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, CodecError> {
        ids.iter()
            .map(|id| {
                char::from_u32(*id)
                    .ok_or_else(|| CodecError::Decode(format!("invalid codepoint {id}")))
            })
            .collect()
    }
}
