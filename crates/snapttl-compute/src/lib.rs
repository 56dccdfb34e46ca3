pub mod api;
pub mod credentials;
pub mod error;
pub mod http_client;
pub mod operation;
pub mod requester;

pub use api::{ComputeApi, ComputeConnector, CreateSnapshotRequest};
pub use credentials::{AccessToken, MetadataTokenSource, StaticToken, TokenSource};
pub use error::ComputeError;
pub use http_client::{Endpoints, HttpComputeClient, HttpConnector};
pub use operation::{CreateSnapshotMetadata, Operation, OperationMetadata, OperationStatus};
pub use requester::SnapshotRequester;
