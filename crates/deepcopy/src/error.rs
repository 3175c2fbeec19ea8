//! Error types for cloning operations.

/// Errors raised by the serializing cloner.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// A composite was reached again while it was still being encoded.
    #[error("converting circular structure to JSON: cycle at '{path}'")]
    Cycle { path: String },

    /// The value has no JSON representation at all (e.g. a bare `undefined`).
    #[error("value of kind '{kind}' has no JSON representation")]
    Unrepresentable { kind: &'static str },

    /// Nesting went deeper than the limit passed to the encoder.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    /// JSON encode or decode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by [`crate::Cloner`].
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Composite nesting went deeper than the configured limit.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    RecursionLimitExceeded { depth: usize, limit: usize },

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl CloneError {
    /// Whether the error comes from a configured resource limit rather than
    /// from the shape of the input.
    pub fn is_limit(&self) -> bool {
        matches!(self, Self::RecursionLimitExceeded { .. })
    }
}

/// Result type for [`crate::Cloner`] operations.
pub type CloneResult<T> = Result<T, CloneError>;

/// Result type for serializing clone operations.
pub type SerializationResult<T> = Result<T, SerializationError>;
