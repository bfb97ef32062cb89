// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Contact-to-group relationships.
//!
//! The row id is derived from the pair, so there is at most one
//! membership per (group, contact) and adding again overwrites.

use super::{Entity, list, to_row};
use crate::error::{Result, StateError};
use crate::schema::FieldSpec;
use crate::store::Store;
use crate::tables::{CONTACTS_TABLE, GROUPS_TABLE, MEMBERSHIPS_TABLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRow {
    pub group_id: String,
    pub contact_id: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
}

impl MembershipRow {
    pub fn new<G: Into<String>, C: Into<String>>(group_id: G, contact_id: C) -> Self {
        Self {
            group_id: group_id.into(),
            contact_id: contact_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_role<R: Into<String>>(mut self, role: R) -> Self {
        self.role = role.into();
        self
    }
}

pub const MEMBERSHIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("groupId"),
    FieldSpec::non_empty("contactId"),
    FieldSpec::text("role"),
    FieldSpec::text("startDate"),
    FieldSpec::text("endDate"),
];

impl Entity for MembershipRow {
    const TABLE: &'static str = MEMBERSHIPS_TABLE;
    const FIELDS: &'static [FieldSpec] = MEMBERSHIP_FIELDS;
}

#[must_use]
pub fn membership_row_id(group_id: &str, contact_id: &str) -> String {
    format!("{group_id}:{contact_id}")
}

/// Insert or replace the membership for its (group, contact) pair.
/// Both ends must exist.
pub fn add_member(store: &mut Store, membership: &MembershipRow) -> Result<String> {
    let id = membership_row_id(&membership.group_id, &membership.contact_id);
    let row = to_row(&id, membership)?;
    if !store.has_row(GROUPS_TABLE, &membership.group_id) {
        return Err(StateError::not_found("group", &membership.group_id));
    }
    if !store.has_row(CONTACTS_TABLE, &membership.contact_id) {
        return Err(StateError::not_found("contact", &membership.contact_id));
    }
    store.set_row(MEMBERSHIPS_TABLE, &id, row)?;
    Ok(id)
}

pub fn remove_member(store: &mut Store, group_id: &str, contact_id: &str) {
    let _ = store.del_row(MEMBERSHIPS_TABLE, &membership_row_id(group_id, contact_id));
}

#[must_use]
pub fn list_memberships(store: &Store) -> Vec<(String, MembershipRow)> {
    list(store)
}

#[must_use]
pub fn list_members(store: &Store, group_id: &str) -> Vec<(String, MembershipRow)> {
    list_memberships(store)
        .into_iter()
        .filter(|(_, row)| row.group_id == group_id)
        .collect()
}

/// Ids of the groups `contact_id` belongs to, sorted and de-duplicated.
#[must_use]
pub fn get_groups_for_contact(store: &Store, contact_id: &str) -> Vec<String> {
    let mut groups: Vec<String> = list_memberships(store)
        .into_iter()
        .filter(|(_, row)| row.contact_id == contact_id)
        .map(|(_, row)| row.group_id)
        .collect();
    groups.sort();
    groups.dedup();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::contacts::{ContactRow, set_contact};
    use crate::accessors::groups::{GroupRow, set_group};
    use crate::tables::create_social_store;

    fn seeded() -> Store {
        let mut store = create_social_store();
        for g in ["g2", "g1"] {
            set_group(&mut store, g, &GroupRow::new(g)).unwrap();
        }
        for c in ["c1", "c2"] {
            set_contact(&mut store, c, &ContactRow::new(c)).unwrap();
        }
        store
    }

    #[test]
    fn test_add_is_upsert() {
        let mut store = seeded();
        let first = add_member(&mut store, &MembershipRow::new("g1", "c1").with_role("member")).unwrap();
        let second = add_member(&mut store, &MembershipRow::new("g1", "c1").with_role("lead")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "g1:c1");

        let members = list_members(&store, "g1");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].1.role, "lead");
    }

    #[test]
    fn test_add_requires_both_ends() {
        let mut store = seeded();
        let err = add_member(&mut store, &MembershipRow::new("nope", "c1")).unwrap_err();
        assert!(err.is_not_found());
        let err = add_member(&mut store, &MembershipRow::new("g1", "nope")).unwrap_err();
        assert!(err.is_not_found());
        let err = add_member(&mut store, &MembershipRow::new("", "c1")).unwrap_err();
        assert!(matches!(err, StateError::Validation { .. }));
        assert!(list_memberships(&store).is_empty());
    }

    #[test]
    fn test_remove_and_groups_for_contact() {
        let mut store = seeded();
        add_member(&mut store, &MembershipRow::new("g2", "c1")).unwrap();
        add_member(&mut store, &MembershipRow::new("g1", "c1")).unwrap();
        add_member(&mut store, &MembershipRow::new("g1", "c2")).unwrap();
        assert_eq!(get_groups_for_contact(&store, "c1"), vec!["g1", "g2"]);

        remove_member(&mut store, "g2", "c1");
        remove_member(&mut store, "g2", "c1");
        assert_eq!(get_groups_for_contact(&store, "c1"), vec!["g1"]);
        assert!(get_groups_for_contact(&store, "c3").is_empty());
    }
}
