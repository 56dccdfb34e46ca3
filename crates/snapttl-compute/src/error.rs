use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {status}: {message}")]
    Api { status: u16, message: String },
    #[error("credentials unavailable: {0}")]
    Credentials(String),
    #[error("operation {operation_id} has no metadata")]
    MissingMetadata { operation_id: String },
    #[error("operation {operation_id} carries unexpected metadata: {found}")]
    UnexpectedMetadata { operation_id: String, found: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
