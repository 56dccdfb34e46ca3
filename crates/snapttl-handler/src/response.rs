use serde::{Deserialize, Serialize};

pub const STATUS_OK: u16 = 200;

/// What the function returns to its trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: STATUS_OK,
            body: body.into(),
        }
    }
}
