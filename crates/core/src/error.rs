//! Error types for the dualchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each outbound collaborator has its own error enum; none of them are
//! caught locally, they bubble up to the interaction handler.

use thiserror::Error;

/// The top-level error type for all dualchat operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Speech synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failure of a chat-completion call.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failure of an embedding call.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failure of a knowledge base query or write.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Knowledge base unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Embedding dimension mismatch: index has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Failure of a speech synthesis call.
#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Nothing to synthesize")]
    EmptyText,
}
