pub mod error;
pub mod expiration;
pub mod labels;
pub mod naming;
pub mod request;
pub mod types;

pub use error::CoreError;
pub use expiration::{ExpirationPolicy, Ttl};
pub use labels::{Labels, EXPIRATION_LABEL, LABEL_SCHEMA_VERSION};
pub use request::SnapshotRequest;
pub use types::{OperationOutcome, SnapshotJob};
