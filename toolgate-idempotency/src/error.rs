/// Errors produced while deriving idempotency keys.
#[derive(Debug, thiserror::Error)]
pub enum IdempotencyError {
    /// The value cannot be represented as canonical JSON (for example a map
    /// with non-string keys).
    #[error("cannot canonicalize value: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdempotencyError>;
