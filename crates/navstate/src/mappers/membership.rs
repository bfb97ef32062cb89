// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{JsonLdObject, TYPE, as_node_id, get, node_ref, put_text};
use crate::accessors::memberships::MembershipRow;
use crate::vocab;
use serde_json::Value;

/// An `org:Membership` node, nested under its group. The group id is
/// implied by the enclosing object and not written.
#[must_use]
pub fn membership_to_json_ld(row: &MembershipRow) -> Value {
    let mut obj = JsonLdObject::new();
    let _ = obj.insert(TYPE.into(), vocab::ORG_MEMBERSHIP.compact.into());
    let _ = obj.insert(vocab::ORG_MEMBER.compact.into(), node_ref(&row.contact_id));
    if !row.role.trim().is_empty() {
        let _ = obj.insert(vocab::ORG_ROLE.compact.into(), node_ref(&row.role));
    }
    if !row.start_date.trim().is_empty() || !row.end_date.trim().is_empty() {
        let mut interval = JsonLdObject::new();
        let _ = interval.insert(TYPE.into(), vocab::TIME_INTERVAL.compact.into());
        put_text(&mut interval, vocab::TIME_HAS_BEGINNING, &row.start_date);
        put_text(&mut interval, vocab::TIME_HAS_END, &row.end_date);
        let _ = obj.insert(vocab::ORG_MEMBER_DURING.compact.into(), Value::Object(interval));
    }
    Value::Object(obj)
}

/// The role as a plain string or the `@id` of a reference.
#[must_use]
pub fn extract_role_from_membership_json_ld(membership: &JsonLdObject) -> String {
    as_node_id(get(membership, vocab::ORG_ROLE))
}
