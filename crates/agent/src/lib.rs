//! The context-augmentation loop for codelore.
//!
//! Drives at most N round trips with a language model, expanding an
//! append-only context buffer from the knowledge store or the local
//! filesystem whenever the model asks for more via a `QUERY:` or `FILE:`
//! directive, until the model emits a terminal answer or the iteration
//! budget is exhausted.

pub mod context;
pub mod directive;
pub mod prompt;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextBuffer;
pub use directive::{Directive, DirectiveMode};
pub use runner::AugmentLoop;
