//! The append-only context buffer and its token-budget truncation.
//!
//! Context grows by concatenation of fetched snippets, each preceded by a
//! newline. When its token count exceeds the budget, only the trailing
//! budget-many tokens survive — recency wins over provenance order, and
//! the discarded head is gone for good.

use codelore_core::codec::TokenCodec;
use codelore_core::error::CodecError;

/// Accumulated retrieved knowledge, supplied alongside the instruction on
/// every model query.
#[derive(Debug, Clone, Default)]
pub struct ContextBuffer {
    text: String,
}

impl ContextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fetched snippet, preceded by a newline.
    pub fn append(&mut self, snippet: &str) {
        self.text.push('\n');
        self.text.push_str(snippet);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Trim the buffer to at most `budget` tokens, keeping the tail.
    ///
    /// Returns `Some((before, after))` token counts when truncation
    /// happened, `None` when the buffer already fit. Truncating a
    /// within-budget buffer is a no-op, so the operation is idempotent.
    pub fn truncate_to(
        &mut self,
        codec: &dyn TokenCodec,
        budget: usize,
    ) -> Result<Option<(usize, usize)>, CodecError> {
        let ids = codec.encode(&self.text)?;
        if ids.len() <= budget {
            return Ok(None);
        }

        let before = ids.len();
        let kept = &ids[before - budget..];
        self.text = codec.decode(kept)?;
        Ok(Some((before, budget)))
    }
}
