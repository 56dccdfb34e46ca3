use async_trait::async_trait;
use serde::Serialize;
use snapttl_core::{Labels, SnapshotJob};

use crate::operation::Operation;
use crate::ComputeError;

/// Wire body of a create-snapshot call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    pub folder_id: String,
    pub disk_id: String,
    pub name: String,
    pub description: String,
    pub labels: Labels,
}

impl From<&SnapshotJob> for CreateSnapshotRequest {
    fn from(job: &SnapshotJob) -> Self {
        Self {
            folder_id: job.folder_id.clone(),
            disk_id: job.disk_id.clone(),
            name: job.name.clone(),
            description: job.description.clone(),
            labels: job.labels.clone(),
        }
    }
}

/// Authenticated access to the compute control plane.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn create_snapshot(
        &self,
        request: &CreateSnapshotRequest,
    ) -> Result<Operation, ComputeError>;

    async fn get_operation(&self, operation_id: &str) -> Result<Operation, ComputeError>;
}

/// Produces a [`ComputeApi`] once credentials are in hand.
#[async_trait]
pub trait ComputeConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ComputeApi>, ComputeError>;
}
