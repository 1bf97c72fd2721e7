//! Error types shared across the workspace
//!
//! The taxonomy mirrors the propagation policy of the orchestrator: almost
//! everything degrades to a best-effort success, so most errors here exist
//! to be classified (transient vs. permanent) rather than surfaced.

use thiserror::Error;

/// Workspace-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// A chat provider failed (after the router exhausted all candidates)
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Speech-to-text failed; the orchestrator aborts the turn on this
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Text-to-speech failed past the retry budget
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Configuration problem detected at composition time
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a single chat-provider attempt.
///
/// The router relies on [`ProviderError::is_transient`] to decide whether
/// the last-resort tier may retry; permanent errors (auth failures,
/// exhausted quota) are skipped without retry.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection failure, 5xx, or any other server-side fault
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// 429 or a quota message from the provider
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Credentials rejected (401/403)
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The provider rejected the request itself (other 4xx)
    #[error("provider rejected request: {0}")]
    Api(String),

    /// The provider answered but the body did not parse
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),

    /// Every candidate failed; carries the message of the final attempt
    #[error("all providers failed, last error: {0}")]
    Exhausted(String),
}

impl ProviderError {
    /// Transient errors may be retried; permanent ones are skipped.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::Timeout | ProviderError::RateLimited(_)
        )
    }
}

/// Errors raised by a single synthesis attempt.
///
/// Only [`SynthesisError::Transient`] is eligible for retry; anything else
/// aborts synthesis immediately and the turn proceeds text-only.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Server-class failure (5xx, connection drop) — retryable
    #[error("transient synthesis failure: {0}")]
    Transient(String),

    /// Client-class failure (bad request, auth, unsupported voice)
    #[error("fatal synthesis failure: {0}")]
    Fatal(String),
}

impl SynthesisError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}
