//! Long-running operations as returned by the control plane.

use std::fmt;

use serde::{Deserialize, Serialize};
use snapttl_core::OperationOutcome;

use crate::ComputeError;

pub const CREATE_SNAPSHOT_METADATA_TYPE: &str =
    "type.googleapis.com/yandex.cloud.compute.v1.CreateSnapshotMetadata";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<OperationMetadata>,
    #[serde(default)]
    pub error: Option<OperationStatus>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

/// Error status of a finished operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)
    }
}

/// Operation metadata, resolved by its `@type` when the operation is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMetadata")]
pub enum OperationMetadata {
    CreateSnapshot(CreateSnapshotMetadata),
    Other { type_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotMetadata {
    pub snapshot_id: String,
    pub disk_id: String,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(rename = "@type", default)]
    type_url: String,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawMetadata> for OperationMetadata {
    type Error = serde_json::Error;

    fn try_from(raw: RawMetadata) -> Result<Self, Self::Error> {
        if raw.type_url == CREATE_SNAPSHOT_METADATA_TYPE {
            let meta = serde_json::from_value(serde_json::Value::Object(raw.fields))?;
            Ok(OperationMetadata::CreateSnapshot(meta))
        } else {
            Ok(OperationMetadata::Other {
                type_url: raw.type_url,
            })
        }
    }
}

impl Operation {
    /// Checked access to create-snapshot metadata.
    pub fn create_snapshot_metadata(&self) -> Result<&CreateSnapshotMetadata, ComputeError> {
        match &self.metadata {
            Some(OperationMetadata::CreateSnapshot(meta)) => Ok(meta),
            Some(OperationMetadata::Other { type_url }) => Err(ComputeError::UnexpectedMetadata {
                operation_id: self.id.clone(),
                found: type_url.clone(),
            }),
            None => Err(ComputeError::MissingMetadata {
                operation_id: self.id.clone(),
            }),
        }
    }

    /// `None` while the operation is still running.
    pub fn outcome(&self) -> Result<Option<OperationOutcome>, ComputeError> {
        if !self.done {
            return Ok(None);
        }
        if let Some(status) = &self.error {
            return Ok(Some(OperationOutcome::OperationFailure(status.to_string())));
        }
        let meta = self.create_snapshot_metadata()?;
        Ok(Some(OperationOutcome::Success {
            snapshot_id: meta.snapshot_id.clone(),
            disk_id: meta.disk_id.clone(),
        }))
    }
}
