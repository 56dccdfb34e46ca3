use std::sync::Arc;

use chrono::{DateTime, Utc};
use snapttl_compute::{
    ComputeConnector, HttpConnector, MetadataTokenSource, SnapshotRequester, StaticToken,
    TokenSource,
};
use snapttl_core::{ExpirationPolicy, SnapshotJob, SnapshotRequest};

use crate::classify::classify;
use crate::{HandlerConfig, HandlerError, MessageQueueEvent, Response};

/// The snapshot pipeline: parse, expire, name, create, wait, classify.
///
/// Holds no per-invocation state, so one instance can serve concurrent events.
pub struct SnapshotHandler {
    config: HandlerConfig,
    connector: Arc<dyn ComputeConnector>,
    requester: SnapshotRequester,
}

impl SnapshotHandler {
    pub fn new(config: HandlerConfig, connector: Arc<dyn ComputeConnector>) -> Self {
        let requester = SnapshotRequester::new(config.poll_interval);
        Self {
            config,
            connector,
            requester,
        }
    }

    /// Wire up the HTTP control-plane client. A configured IAM token wins over
    /// the instance metadata service.
    pub fn from_config(config: HandlerConfig) -> Self {
        let tokens: Arc<dyn TokenSource> = match &config.iam_token {
            Some(token) => Arc::new(StaticToken::new(token.secret())),
            None => Arc::new(MetadataTokenSource::new(config.endpoints.metadata.clone())),
        };
        let connector = Arc::new(HttpConnector::new(config.endpoints.clone(), tokens));
        Self::new(config, connector)
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub async fn handle(&self, event: &MessageQueueEvent) -> Result<Response, HandlerError> {
        let request = parse_request(event)?;
        let expiration = ExpirationPolicy::starting_now(self.config.ttl)?;
        self.run(request, expiration).await
    }

    /// [`handle`](Self::handle) with the invocation time supplied by the caller.
    pub async fn handle_at(
        &self,
        event: &MessageQueueEvent,
        now: DateTime<Utc>,
    ) -> Result<Response, HandlerError> {
        let request = parse_request(event)?;
        let expiration = ExpirationPolicy::starting_at(now, self.config.ttl)?;
        self.run(request, expiration).await
    }

    /// The job an invocation at `now` would submit. Makes no remote calls.
    pub fn plan(
        &self,
        event: &MessageQueueEvent,
        now: DateTime<Utc>,
    ) -> Result<SnapshotJob, HandlerError> {
        let request = parse_request(event)?;
        let expiration = ExpirationPolicy::starting_at(now, self.config.ttl)?;
        Ok(SnapshotJob::build(&request, &expiration))
    }

    async fn run(
        &self,
        request: SnapshotRequest,
        expiration: ExpirationPolicy,
    ) -> Result<Response, HandlerError> {
        let job = SnapshotJob::build(&request, &expiration);
        tracing::info!(
            "snapshotting disk {} in folder {} as {} (expires {})",
            job.disk_id,
            job.folder_id,
            job.name,
            expiration.expiration_timestamp()
        );

        let api = self
            .connector
            .connect()
            .await
            .map_err(HandlerError::Credentials)?;
        let outcome = self
            .requester
            .request(api.as_ref(), &job)
            .await
            .map_err(HandlerError::Operation)?;

        classify(outcome, self.config.failure_policy)
    }
}

fn parse_request(event: &MessageQueueEvent) -> Result<SnapshotRequest, HandlerError> {
    let message = event.first_message()?;
    let request = SnapshotRequest::from_json(&message.details.message.body)?;
    Ok(request)
}
