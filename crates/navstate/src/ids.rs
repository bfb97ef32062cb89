// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Row ids and timestamps.
//!
//! Entity ids are `<prefix>_<uuid7>`, so they sort by creation time.

use chrono::{SecondsFormat, Utc};

pub const PERSONA_PREFIX: &str = "persona";
pub const CONTACT_PREFIX: &str = "contact";
pub const GROUP_PREFIX: &str = "group";
pub const ACTIVITY_PREFIX: &str = "activity";
pub const SYNC_ROOT_PREFIX: &str = "syncroot";

#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid7::uuid7())
}

#[must_use]
pub fn new_persona_id() -> String {
    new_id(PERSONA_PREFIX)
}

#[must_use]
pub fn new_contact_id() -> String {
    new_id(CONTACT_PREFIX)
}

#[must_use]
pub fn new_group_id() -> String {
    new_id(GROUP_PREFIX)
}

#[must_use]
pub fn new_activity_id() -> String {
    new_id(ACTIVITY_PREFIX)
}

#[must_use]
pub fn new_sync_root_id() -> String {
    new_id(SYNC_ROOT_PREFIX)
}

/// Stable contact identifier carried through interchange as `vcard:hasUID`.
#[must_use]
pub fn new_contact_uid() -> String {
    format!("urn:uuid:{}", uuid7::uuid7())
}

/// Current time as RFC 3339 with millisecond precision.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_distinct() {
        let a = new_group_id();
        let b = new_group_id();
        assert!(a.starts_with("group_"));
        assert_ne!(a, b);
        assert!(new_contact_uid().starts_with("urn:uuid:"));
    }

    #[test]
    fn test_timestamp_is_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
