//! Error types for the generative-service adapter.
//!
//! Uses `thiserror` for typed errors that surface through the adapter
//! pipeline: HTTP calls, prompt rendering, response parsing, and case
//! validation. None of these are fatal to the session; the core degrades
//! to in-fiction fallback messages.

/// Errors that can occur while talking to the generative service.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// An LLM backend returned an error or was unreachable.
    #[error("backend error: {0}")]
    Backend(String),

    /// Failed to render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// The response could not be parsed into the expected shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// A generated case violated its invariants (guilty-suspect count,
    /// missing required fields). Surfaced instead of installing the case.
    #[error("invalid generated case: {0}")]
    InvalidCase(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
