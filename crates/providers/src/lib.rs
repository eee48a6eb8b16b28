//! LLM provider implementations for codelore.
//!
//! One production provider: any OpenAI-compatible endpoint, which covers
//! Ollama, OpenAI, vLLM, Together, and the rest. The CLI builds it from
//! [`codelore_config::AppConfig`].

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use codelore_config::AppConfig;
use codelore_core::Provider;
use std::sync::Arc;

/// Build the configured provider.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    Arc::new(OpenAiCompatProvider::new(
        "openai-compat",
        &config.provider.api_url,
        config.provider.api_key.as_deref().unwrap_or("ollama"),
    ))
}
