//! HuggingFace tokenizer-backed [`TokenCodec`] implementation.
//!
//! Loads a `tokenizer.json` either from a local path or by downloading it
//! from the HuggingFace Hub. Encoding skips special tokens so that keeping
//! a trailing slice of ids and decoding it yields a clean text suffix.

use codelore_core::codec::TokenCodec;
use codelore_core::error::CodecError;
use hf_hub::api::sync::Api;
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::info;

/// A token codec backed by a HuggingFace tokenizer.
#[derive(Debug)]
pub struct HfCodec {
    tokenizer: Tokenizer,
}

impl HfCodec {
    /// Load from a local `tokenizer.json` file.
    pub fn from_file(path: &Path) -> Result<Self, CodecError> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| CodecError::Load(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "Tokenizer loaded");
        Ok(Self { tokenizer })
    }

    /// Download `tokenizer.json` from a HuggingFace Hub repo and load it.
    ///
    /// Files are cached by `hf-hub`, so repeated runs only hit the network
    /// once.
    pub fn from_pretrained(repo: &str) -> Result<Self, CodecError> {
        let api = Api::new()
            .map_err(|e| CodecError::Load(format!("HuggingFace Hub API error: {e}")))?;

        let tokenizer_path = api
            .model(repo.to_string())
            .get("tokenizer.json")
            .map_err(|e| {
                CodecError::Load(format!("Failed to download tokenizer from '{repo}': {e}"))
            })?;

        info!(repo, path = %tokenizer_path.display(), "Tokenizer ready");
        Self::from_file(&tokenizer_path)
    }
}

impl TokenCodec for HfCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>, CodecError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, CodecError> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}
