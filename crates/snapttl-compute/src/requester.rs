use std::time::Duration;

use snapttl_core::{OperationOutcome, SnapshotJob};

use crate::api::{ComputeApi, CreateSnapshotRequest};
use crate::ComputeError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Submits a snapshot job and waits for the resulting operation to settle.
#[derive(Debug, Clone)]
pub struct SnapshotRequester {
    poll_interval: Duration,
}

impl Default for SnapshotRequester {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl SnapshotRequester {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// A rejected create call is reported as [`OperationOutcome::TransportFailure`]
    /// and an operation that finishes with an error as
    /// [`OperationOutcome::OperationFailure`]. `Err` is reserved for faults after
    /// the create call was accepted: polling errors and unreadable metadata. In
    /// that case the snapshot may still come into existence remotely.
    ///
    /// There is no deadline; the wait ends when the operation does.
    pub async fn request(
        &self,
        api: &dyn ComputeApi,
        job: &SnapshotJob,
    ) -> Result<OperationOutcome, ComputeError> {
        let request = CreateSnapshotRequest::from(job);
        let mut operation = match api.create_snapshot(&request).await {
            Ok(op) => op,
            Err(e) => {
                tracing::warn!("create snapshot {} for disk {} failed: {}", job.name, job.disk_id, e);
                return Ok(OperationOutcome::TransportFailure(e.to_string()));
            }
        };
        tracing::info!("snapshot {} requested, operation {}", job.name, operation.id);

        let mut polls: u32 = 0;
        loop {
            if let Some(outcome) = operation.outcome()? {
                tracing::info!(
                    "operation {} settled after {} polls: {:?}",
                    operation.id,
                    polls,
                    outcome
                );
                return Ok(outcome);
            }

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            tracing::debug!("polling operation {} (attempt {})", operation.id, polls);
            operation = api.get_operation(&operation.id).await?;
        }
    }
}
