//! Directive parsing — turning a model response into a loop action.
//!
//! A response either carries a `QUERY:` marker (search the knowledge
//! store), a `FILE:` marker (read a local file), or neither, in which case
//! it is the final answer. `QUERY:` is checked before `FILE:`, so a
//! response containing both resolves to the query branch.

use std::str::FromStr;

/// Marker for a knowledge-store search request.
pub const QUERY_MARKER: &str = "QUERY:";

/// Marker for a local file read request.
pub const FILE_MARKER: &str = "FILE:";

/// A parsed instruction extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Search the knowledge store with this query text.
    Query(String),
    /// Read the file at this path into context.
    File(String),
    /// No directive — the response is a final answer.
    None,
}

/// How directive markers are detected.
///
/// Both behaviors exist in the wild: `Substring` accepts a marker anywhere
/// in the response, `Prefix` only at its very start. The default is
/// `Substring`, the more forgiving of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectiveMode {
    #[default]
    Substring,
    Prefix,
}

impl FromStr for DirectiveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substring" => Ok(Self::Substring),
            "prefix" => Ok(Self::Prefix),
            other => Err(format!("unknown directive mode: {other}")),
        }
    }
}

/// Parse a model response for a directive.
///
/// The directive text is everything after the marker, whitespace-stripped.
/// An empty remainder is passed through as-is; the fetch step deals with
/// it according to its own contract.
pub fn parse(response: &str, mode: DirectiveMode) -> Directive {
    match mode {
        DirectiveMode::Substring => {
            if let Some(idx) = response.find(QUERY_MARKER) {
                return Directive::Query(after_marker(response, idx, QUERY_MARKER));
            }
            if let Some(idx) = response.find(FILE_MARKER) {
                return Directive::File(after_marker(response, idx, FILE_MARKER));
            }
            Directive::None
        }
        DirectiveMode::Prefix => {
            if let Some(rest) = response.strip_prefix(QUERY_MARKER) {
                return Directive::Query(rest.trim().to_string());
            }
            if let Some(rest) = response.strip_prefix(FILE_MARKER) {
                return Directive::File(rest.trim().to_string());
            }
            Directive::None
        }
    }
}

fn after_marker(response: &str, idx: usize, marker: &str) -> String {
    response[idx + marker.len()..].trim().to_string()
}
