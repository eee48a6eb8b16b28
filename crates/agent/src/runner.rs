//! The context-augmentation loop implementation.
//!
//! One invocation owns one instruction, one context buffer, and one
//! iteration counter; nothing persists across runs. Collaborator calls are
//! awaited strictly in sequence — there is no concurrency, no loop-level
//! timeout, and no retry. Only a missing file is recoverable; every other
//! collaborator failure aborts the run.

use crate::context::ContextBuffer;
use crate::directive::{self, Directive, DirectiveMode};
use crate::prompt;
use chrono::Utc;
use codelore_core::codec::TokenCodec;
use codelore_core::event::{EventBus, LoopEvent};
use codelore_core::provider::{Provider, ProviderRequest};
use codelore_core::retrieval::Retriever;
use codelore_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The bounded query/fetch loop.
pub struct AugmentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The knowledge store
    retriever: Arc<dyn Retriever>,

    /// Tokenizer used to measure and trim context
    codec: Arc<dyn TokenCodec>,

    /// Event bus for surfacing intermediate exchanges
    event_bus: Arc<EventBus>,

    /// The chat model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Iteration ceiling before the forced final call
    max_iterations: u32,

    /// Context token budget
    context_budget: usize,

    /// Maximum snippets per QUERY: directive
    search_limit: usize,

    /// How directive markers are detected
    mode: DirectiveMode,

    /// Path prefixes FILE: must not read. Empty = allow all.
    forbidden_paths: Vec<String>,
}

enum FileFetch {
    Content(String),
    NotFound,
    Refused,
}

impl AugmentLoop {
    /// Create a new loop with default settings.
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        codec: Arc<dyn TokenCodec>,
        event_bus: Arc<EventBus>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            retriever,
            codec,
            event_bus,
            model: model.into(),
            temperature: 0.7,
            max_iterations: 5,
            context_budget: 4096 - 500,
            search_limit: 5,
            mode: DirectiveMode::default(),
            forbidden_paths: vec![],
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the iteration ceiling.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the context token budget.
    pub fn with_context_budget(mut self, budget: usize) -> Self {
        self.context_budget = budget;
        self
    }

    /// Set the maximum snippets fetched per QUERY: directive.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set how directive markers are detected.
    pub fn with_directive_mode(mut self, mode: DirectiveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Forbid FILE: reads under these path prefixes.
    pub fn with_forbidden_paths(mut self, paths: Vec<String>) -> Self {
        self.forbidden_paths = paths;
        self
    }

    /// Run the loop for one instruction and return the final answer.
    ///
    /// Performs at most `max_iterations` completion calls plus one forced
    /// final call when the ceiling is hit.
    pub async fn run(&self, instruction: &str) -> Result<String> {
        let mut context = ContextBuffer::new();
        let mut iteration: u32 = 0;

        info!(model = %self.model, max_iterations = self.max_iterations, "Starting loop");

        while iteration < self.max_iterations {
            if let Some((before, after)) =
                context.truncate_to(self.codec.as_ref(), self.context_budget)?
            {
                debug!(before, after, "Context truncated to budget");
                self.event_bus.publish(LoopEvent::ContextTruncated {
                    before_tokens: before,
                    after_tokens: after,
                    timestamp: Utc::now(),
                });
            }

            let response = self.query_model(instruction, context.as_str()).await?;

            debug!(iteration, len = response.len(), "Response received");

            match directive::parse(&response, self.mode) {
                Directive::None => {
                    info!(iteration, "Terminal answer received");
                    return Ok(response);
                }
                Directive::Query(query) => {
                    self.surface(iteration + 1, &response);

                    let snippets = self.retriever.retrieve(&query, self.search_limit).await?;

                    debug!(query = %query, count = snippets.len(), "Snippets retrieved");
                    self.event_bus.publish(LoopEvent::KnowledgeRetrieved {
                        query,
                        snippets: snippets.len(),
                        timestamp: Utc::now(),
                    });

                    let joined = snippets
                        .iter()
                        .map(|s| s.content.as_str())
                        .collect::<Vec<_>>()
                        .join("\n");
                    context.append(&joined);
                }
                Directive::File(path) => {
                    self.surface(iteration + 1, &response);

                    let (found, addition) = match self.fetch_file(&path).await? {
                        FileFetch::Content(content) => (true, content),
                        FileFetch::NotFound => {
                            (false, format!("[Error: File '{path}' not found.]"))
                        }
                        FileFetch::Refused => {
                            (false, format!("[Error: File '{path}' not permitted.]"))
                        }
                    };

                    self.event_bus.publish(LoopEvent::FileFetched {
                        path,
                        found,
                        timestamp: Utc::now(),
                    });
                    context.append(&addition);
                }
            }

            iteration += 1;
        }

        // Ceiling hit: one forced final call, no directive parsing.
        warn!(
            iterations = iteration,
            "Iteration ceiling reached, forcing final answer"
        );
        self.event_bus.publish(LoopEvent::CeilingReached {
            iterations: iteration,
            timestamp: Utc::now(),
        });

        self.query_model(instruction, context.as_str()).await
    }

    /// One completion round trip.
    async fn query_model(&self, instruction: &str, context: &str) -> Result<String> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: prompt::build_messages(instruction, context),
            temperature: self.temperature,
            max_tokens: None,
        };

        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    /// Surface an intermediate (non-terminal) response to subscribers.
    fn surface(&self, iteration: u32, content: &str) {
        self.event_bus.publish(LoopEvent::ResponseReceived {
            iteration,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Read a file for a FILE: directive.
    ///
    /// Not-found and policy refusals are recoverable and become inline
    /// context markers; any other I/O failure propagates.
    async fn fetch_file(&self, path: &str) -> Result<FileFetch> {
        if self
            .forbidden_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            warn!(path, "FILE: directive refused by path policy");
            return Ok(FileFetch::Refused);
        }

        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(FileFetch::Content(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileFetch::NotFound),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
