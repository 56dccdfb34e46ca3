use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed job payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid TTL {value:?}: {reason}")]
    InvalidTtl { value: String, reason: String },
    #[error("expiration overflows: {created_at} + {ttl_seconds}s")]
    ExpirationOverflow { created_at: i64, ttl_seconds: u64 },
    #[error("invalid label {key}: {reason}")]
    InvalidLabel { key: String, reason: String },
}
