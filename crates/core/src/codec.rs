//! TokenCodec trait — the abstraction over the tokenizer collaborator.
//!
//! The loop needs two operations: encode a string into token ids, and
//! decode a slice of ids back to text. Truncating the context buffer keeps
//! only the trailing ids, so `decode` must tolerate starting mid-sequence.

use crate::error::CodecError;

/// The tokenizer collaborator.
pub trait TokenCodec: Send + Sync {
    /// Encode text into a sequence of token ids.
    fn encode(&self, text: &str) -> std::result::Result<Vec<u32>, CodecError>;

    /// Decode a sequence of token ids back into text.
    fn decode(&self, ids: &[u32]) -> std::result::Result<String, CodecError>;
}
