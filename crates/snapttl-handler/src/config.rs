use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use snapttl_compute::requester::DEFAULT_POLL_INTERVAL;
use snapttl_compute::{AccessToken, Endpoints};
use snapttl_core::Ttl;

use crate::classify::FailurePolicy;
use crate::HandlerError;

pub const TTL_VAR: &str = "TTL";
pub const COMPUTE_ENDPOINT_VAR: &str = "COMPUTE_ENDPOINT";
pub const OPERATION_ENDPOINT_VAR: &str = "OPERATION_ENDPOINT";
pub const METADATA_ENDPOINT_VAR: &str = "METADATA_ENDPOINT";
pub const POLL_INTERVAL_VAR: &str = "OPERATION_POLL_INTERVAL_MS";
pub const FAILURE_POLICY_VAR: &str = "SNAPSHOT_FAILURE_POLICY";
pub const IAM_TOKEN_VAR: &str = "YC_IAM_TOKEN";

/// Validated handler settings. Built once, before any event is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub ttl: Ttl,
    pub endpoints: Endpoints,
    pub poll_interval: Duration,
    pub failure_policy: FailurePolicy,
    /// When unset, tokens come from the instance metadata service.
    pub iam_token: Option<AccessToken>,
}

/// File form of the same settings. Keys mirror the environment variables.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    ttl: Option<i64>,
    compute_endpoint: Option<String>,
    operation_endpoint: Option<String>,
    metadata_endpoint: Option<String>,
    operation_poll_interval_ms: Option<u64>,
    snapshot_failure_policy: Option<FailurePolicy>,
    iam_token: Option<String>,
}

impl HandlerConfig {
    pub fn new(ttl: Ttl) -> Self {
        Self {
            ttl,
            endpoints: Endpoints::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            failure_policy: FailurePolicy::default(),
            iam_token: None,
        }
    }

    pub fn from_env() -> Result<Self, HandlerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source using the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HandlerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl = lookup(TTL_VAR)
            .ok_or_else(|| HandlerError::Config(format!("{TTL_VAR} is not set")))?
            .parse::<Ttl>()
            .map_err(|e| HandlerError::Config(e.to_string()))?;

        let mut config = Self::new(ttl);

        if let Some(url) = lookup(COMPUTE_ENDPOINT_VAR) {
            config.endpoints.compute = validate_endpoint(COMPUTE_ENDPOINT_VAR, url)?;
        }
        if let Some(url) = lookup(OPERATION_ENDPOINT_VAR) {
            config.endpoints.operation = validate_endpoint(OPERATION_ENDPOINT_VAR, url)?;
        }
        if let Some(url) = lookup(METADATA_ENDPOINT_VAR) {
            config.endpoints.metadata = validate_endpoint(METADATA_ENDPOINT_VAR, url)?;
        }

        if let Some(raw) = lookup(POLL_INTERVAL_VAR) {
            let millis = raw.trim().parse::<u64>().map_err(|e| {
                HandlerError::Config(format!("{POLL_INTERVAL_VAR} {raw:?}: {e}"))
            })?;
            if millis == 0 {
                return Err(HandlerError::Config(format!(
                    "{POLL_INTERVAL_VAR} must be positive"
                )));
            }
            config.poll_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(FAILURE_POLICY_VAR) {
            config.failure_policy = raw.parse()?;
        }

        config.iam_token = lookup(IAM_TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, HandlerError> {
        let file: FileConfig =
            toml::from_str(content).map_err(|e| HandlerError::Config(e.to_string()))?;

        let mut values: HashMap<&str, String> = HashMap::new();
        let mut set = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                values.insert(key, value);
            }
        };
        set(TTL_VAR, file.ttl.map(|t| t.to_string()));
        set(COMPUTE_ENDPOINT_VAR, file.compute_endpoint);
        set(OPERATION_ENDPOINT_VAR, file.operation_endpoint);
        set(METADATA_ENDPOINT_VAR, file.metadata_endpoint);
        set(
            POLL_INTERVAL_VAR,
            file.operation_poll_interval_ms.map(|ms| ms.to_string()),
        );
        set(
            FAILURE_POLICY_VAR,
            file.snapshot_failure_policy.map(|p| p.to_string()),
        );
        set(IAM_TOKEN_VAR, file.iam_token);

        Self::from_lookup(|key| values.get(key).cloned())
    }

    pub fn load(path: &Path) -> Result<Self, HandlerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HandlerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }
}

fn validate_endpoint(key: &str, url: String) -> Result<String, HandlerError> {
    let url = url.trim().to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(HandlerError::Config(format!(
            "{key} must start with http:// or https://: {url}"
        )));
    }
    Ok(url)
}
