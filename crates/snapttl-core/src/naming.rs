//! Snapshot name and description generation.

use std::fmt::Display;

use chrono::{Local, TimeZone};

pub const NAME_PREFIX: &str = "snapshot";
pub const NAME_SEPARATOR: char = '-';
/// Upper bound the control plane enforces on resource names.
pub const MAX_NAME_LEN: usize = 63;

const DESCRIPTION_PREFIX: &str = "Expiration:  ";
const DESCRIPTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// `snapshot-<ts>-<disk_name>`, cut at the tail to [`MAX_NAME_LEN`] bytes.
///
/// Only the disk-name suffix is ever lost: the prefix and a realistic timestamp
/// take at most 20 bytes. The sweep reads the label, not the name, so the cut
/// is cosmetic.
pub fn snapshot_name(expiration_timestamp: i64, disk_name: &str) -> String {
    let mut name = format!(
        "{NAME_PREFIX}{NAME_SEPARATOR}{expiration_timestamp}{NAME_SEPARATOR}{disk_name}"
    );
    truncate_on_char_boundary(&mut name, MAX_NAME_LEN);
    name
}

fn truncate_on_char_boundary(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// Description rendered in the host's local time zone.
pub fn describe_expiration(expiration_timestamp: i64) -> String {
    describe_expiration_in(expiration_timestamp, &Local)
}

pub fn describe_expiration_in<Tz>(expiration_timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(expiration_timestamp, 0).single() {
        Some(at) => format!("{DESCRIPTION_PREFIX}{}", at.format(DESCRIPTION_TIME_FORMAT)),
        // Outside chrono's representable range.
        None => format!("{DESCRIPTION_PREFIX}{expiration_timestamp}"),
    }
}
