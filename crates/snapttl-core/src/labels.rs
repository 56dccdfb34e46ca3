//! Label contract shared with the expiration sweep.
//!
//! Version 1: every snapshot carries `expiration_ts`, the unix-seconds expiration
//! rendered as a plain decimal string (no sign for positive values, no padding).
//! The sweep deletes a snapshot once the current time passes that value. Renaming
//! the key or changing the encoding breaks every deployed sweep.

use std::collections::BTreeMap;

use crate::CoreError;

pub const EXPIRATION_LABEL: &str = "expiration_ts";
pub const LABEL_SCHEMA_VERSION: u32 = 1;

pub type Labels = BTreeMap<String, String>;

/// Labels attached to a freshly created snapshot.
pub fn expiration_labels(expiration_timestamp: i64) -> Labels {
    let mut labels = Labels::new();
    labels.insert(
        EXPIRATION_LABEL.to_string(),
        expiration_timestamp.to_string(),
    );
    labels
}

/// Read the expiration back out of a label set. `None` means the snapshot is not
/// managed by this contract.
pub fn parse_expiration(labels: &Labels) -> Result<Option<i64>, CoreError> {
    let Some(raw) = labels.get(EXPIRATION_LABEL) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(Some)
        .map_err(|e| CoreError::InvalidLabel {
            key: EXPIRATION_LABEL.to_string(),
            reason: format!("{raw:?}: {e}"),
        })
}
