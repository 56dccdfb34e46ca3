//! IAM token acquisition.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ComputeError;

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Bearer token for the control plane. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<AccessToken, ComputeError>;
}

/// A token supplied up front, e.g. from the environment.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(AccessToken::new(token))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<AccessToken, ComputeError> {
        if self.0.secret().is_empty() {
            return Err(ComputeError::Credentials("static token is empty".into()));
        }
        Ok(self.0.clone())
    }
}

/// Token of the service account attached to the running instance or function.
#[derive(Debug, Clone)]
pub struct MetadataTokenSource {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl MetadataTokenSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn token(&self) -> Result<AccessToken, ComputeError> {
        let url = format!("{}{}", self.endpoint, METADATA_TOKEN_PATH);
        let resp = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ComputeError::Credentials(format!("metadata service unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(ComputeError::Credentials(format!(
                "metadata service returned {}",
                resp.status()
            )));
        }

        let body: MetadataTokenResponse = resp
            .json()
            .await
            .map_err(|e| ComputeError::Credentials(format!("bad token response: {e}")))?;
        if body.access_token.is_empty() {
            return Err(ComputeError::Credentials(
                "metadata service returned an empty token".into(),
            ));
        }

        if let Some(expires_in) = body.expires_in {
            tracing::debug!("acquired instance token valid for {}s", expires_in);
        }
        Ok(AccessToken::new(body.access_token))
    }
}
