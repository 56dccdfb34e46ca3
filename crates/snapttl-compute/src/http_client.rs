use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{ComputeApi, ComputeConnector, CreateSnapshotRequest};
use crate::credentials::{AccessToken, TokenSource};
use crate::operation::Operation;
use crate::ComputeError;

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.api.cloud.yandex.net";
pub const DEFAULT_OPERATION_ENDPOINT: &str = "https://operation.api.cloud.yandex.net";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";

const REQUEST_ID_HEADER: &str = "x-client-request-id";

/// Base URLs of the services the handler talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compute: String,
    pub operation: String,
    pub metadata: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            compute: DEFAULT_COMPUTE_ENDPOINT.to_string(),
            operation: DEFAULT_OPERATION_ENDPOINT.to_string(),
            metadata: DEFAULT_METADATA_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL. Handy for tests and local emulators.
    pub fn single(base_url: &str) -> Self {
        Self {
            compute: base_url.to_string(),
            operation: base_url.to_string(),
            metadata: base_url.to_string(),
        }
    }

    fn normalized(mut self) -> Self {
        for url in [&mut self.compute, &mut self.operation, &mut self.metadata] {
            let trimmed = url.trim_end_matches('/').len();
            url.truncate(trimmed);
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpComputeClient {
    endpoints: Endpoints,
    token: AccessToken,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl HttpComputeClient {
    pub fn new(endpoints: Endpoints, token: AccessToken) -> Self {
        Self::with_client(endpoints, token, reqwest::Client::new())
    }

    pub fn with_client(endpoints: Endpoints, token: AccessToken, client: reqwest::Client) -> Self {
        Self {
            endpoints: endpoints.normalized(),
            token,
            client,
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let request_id = ulid::Ulid::new().to_string();
        tracing::debug!("{} {} ({})", method, url, request_id);

        self.client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id)
            .bearer_auth(self.token.secret())
    }

    async fn read_operation(resp: reqwest::Response) -> Result<Operation, ComputeError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ComputeError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }
        Ok(resp.json().await?)
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if !err.message.is_empty() => format!("code {}: {}", err.code, err.message),
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    }
}

#[async_trait]
impl ComputeApi for HttpComputeClient {
    async fn create_snapshot(
        &self,
        request: &CreateSnapshotRequest,
    ) -> Result<Operation, ComputeError> {
        let url = format!("{}/compute/v1/snapshots", self.endpoints.compute);
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(request)
            .send()
            .await?;
        Self::read_operation(resp).await
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Operation, ComputeError> {
        let url = format!(
            "{}/operations/{}",
            self.endpoints.operation,
            urlencoding::encode(operation_id)
        );
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        Self::read_operation(resp).await
    }
}

/// Fetches a token per invocation and wraps it in an [`HttpComputeClient`].
pub struct HttpConnector {
    endpoints: Endpoints,
    tokens: Arc<dyn TokenSource>,
    client: reqwest::Client,
}

impl HttpConnector {
    pub fn new(endpoints: Endpoints, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            endpoints,
            tokens,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ComputeConnector for HttpConnector {
    async fn connect(&self) -> Result<Box<dyn ComputeApi>, ComputeError> {
        let token = self.tokens.token().await?;
        Ok(Box::new(HttpComputeClient::with_client(
            self.endpoints.clone(),
            token,
            self.client.clone(),
        )))
    }
}
