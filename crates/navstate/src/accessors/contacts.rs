// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{Entity, list, read, write};
use crate::error::{Result, StateError};
use crate::ids::{new_contact_uid, now_timestamp};
use crate::schema::{CellType, FieldSpec};
use crate::store::Store;
use crate::tables::{CONTACTS_TABLE, MEMBERSHIPS_TABLE, PERSONAS_TABLE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    #[default]
    Person,
    Agent,
    Organization,
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContactKind::Person => "person",
            ContactKind::Agent => "agent",
            ContactKind::Organization => "organization",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRow {
    pub name: String,
    /// Identity that survives export and import, independent of the row id.
    pub uid: String,
    pub nickname: String,
    pub kind: ContactKind,
    /// One address, or a JSON array of them.
    pub email: String,
    /// One number, or a JSON array of them.
    pub phone: String,
    pub url: String,
    pub photo: String,
    pub notes: String,
    pub organization: String,
    pub role: String,
    pub web_id: String,
    pub agent_category: String,
    pub linked_persona: String,
    pub updated_at: String,
}

impl ContactRow {
    /// A person contact with a fresh uid, stamped now.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            uid: new_contact_uid(),
            updated_at: now_timestamp(),
            ..Self::default()
        }
    }
}

pub const CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("name"),
    FieldSpec::non_empty("uid"),
    FieldSpec::text("nickname"),
    FieldSpec::non_empty("kind").one_of(&["person", "agent", "organization"]),
    FieldSpec::text("email"),
    FieldSpec::text("phone"),
    FieldSpec::text("url"),
    FieldSpec::text("photo"),
    FieldSpec::text("notes"),
    FieldSpec::text("organization"),
    FieldSpec::text("role"),
    FieldSpec::text("webId"),
    FieldSpec::text("agentCategory"),
    FieldSpec::text("linkedPersona"),
    FieldSpec::required("updatedAt", CellType::String),
];

impl Entity for ContactRow {
    const TABLE: &'static str = CONTACTS_TABLE;
    const FIELDS: &'static [FieldSpec] = CONTACT_FIELDS;
}

#[must_use]
pub fn get_contact(store: &Store, id: &str) -> Option<ContactRow> {
    read(store, id)
}

pub fn set_contact(store: &mut Store, id: &str, contact: &ContactRow) -> Result<()> {
    write(store, id, contact)
}

#[must_use]
pub fn list_contacts(store: &Store) -> Vec<(String, ContactRow)> {
    list(store)
}

/// Remove a contact and every membership that refers to it.
pub fn delete_contact(store: &mut Store, id: &str) {
    let stale: Vec<String> = store
        .rows(MEMBERSHIPS_TABLE)
        .filter(|(_, row)| row.get("contactId").and_then(|c| c.as_str()) == Some(id))
        .map(|(rid, _)| rid.to_string())
        .collect();
    for rid in stale {
        let _ = store.del_row(MEMBERSHIPS_TABLE, &rid);
    }
    let _ = store.del_row(CONTACTS_TABLE, id);
}

/// Case-insensitive substring match over the contact's text fields.
/// A blank query matches everything.
#[must_use]
pub fn search_contacts(store: &Store, query: &str) -> Vec<(String, ContactRow)> {
    let needle = query.trim().to_lowercase();
    let contacts = list_contacts(store);
    if needle.is_empty() {
        return contacts;
    }
    contacts
        .into_iter()
        .filter(|(_, row)| {
            [
                &row.name,
                &row.nickname,
                &row.email,
                &row.phone,
                &row.organization,
                &row.notes,
                &row.role,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn link_contact_to_persona(store: &mut Store, contact_id: &str, persona_id: &str) -> Result<()> {
    if get_contact(store, contact_id).is_none() {
        return Err(StateError::not_found("contact", contact_id));
    }
    if !store.has_row(PERSONAS_TABLE, persona_id) {
        return Err(StateError::not_found("persona", persona_id));
    }
    store.set_cell(CONTACTS_TABLE, contact_id, "linkedPersona", persona_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::groups::{GroupRow, set_group};
    use crate::accessors::memberships::{MembershipRow, add_member, list_members};
    use crate::accessors::personas::{PersonaRow, set_persona};
    use crate::tables::create_social_store;

    fn contact(name: &str) -> ContactRow {
        ContactRow::new(name)
    }

    #[test]
    fn test_roundtrip_and_kind() {
        let mut store = create_social_store();
        let mut c = contact("Bot");
        c.kind = ContactKind::Agent;
        c.agent_category = "assistant".into();
        set_contact(&mut store, "c1", &c).unwrap();
        assert_eq!(get_contact(&store, "c1"), Some(c));
        assert_eq!(
            store.get_cell(CONTACTS_TABLE, "c1", "kind").and_then(|c| c.as_str()),
            Some("agent")
        );
    }

    #[test]
    fn test_unknown_kind_is_dropped_on_read() {
        let mut store = create_social_store();
        set_contact(&mut store, "c1", &contact("Ann")).unwrap();
        store.set_cell(CONTACTS_TABLE, "c1", "kind", "robot").unwrap();
        assert_eq!(get_contact(&store, "c1"), None);
        assert!(list_contacts(&store).is_empty());
    }

    #[test]
    fn test_search() {
        let mut store = create_social_store();
        let mut a = contact("Alice Smith");
        a.organization = "Acme".into();
        set_contact(&mut store, "a", &a).unwrap();
        let mut b = contact("Bob");
        b.notes = "met at ACME picnic".into();
        set_contact(&mut store, "b", &b).unwrap();
        set_contact(&mut store, "c", &contact("Carol")).unwrap();

        let ids = |q: &str| -> Vec<String> {
            search_contacts(&store, q).into_iter().map(|(id, _)| id).collect()
        };
        assert_eq!(ids("acme"), vec!["a", "b"]);
        assert_eq!(ids("  smith "), vec!["a"]);
        assert_eq!(ids(""), vec!["a", "b", "c"]);
        assert!(ids("zed").is_empty());
    }

    #[test]
    fn test_delete_cascades_memberships() {
        let mut store = create_social_store();
        set_contact(&mut store, "c1", &contact("Ann")).unwrap();
        set_contact(&mut store, "c2", &contact("Ben")).unwrap();
        set_group(&mut store, "g", &GroupRow::new("Team")).unwrap();
        add_member(&mut store, &MembershipRow::new("g", "c1")).unwrap();
        add_member(&mut store, &MembershipRow::new("g", "c2")).unwrap();

        delete_contact(&mut store, "c1");
        delete_contact(&mut store, "c1");

        let members: Vec<String> = list_members(&store, "g")
            .into_iter()
            .map(|(_, m)| m.contact_id)
            .collect();
        assert_eq!(members, vec!["c2"]);
        assert_eq!(get_contact(&store, "c1"), None);
    }

    #[test]
    fn test_link_to_persona() {
        let mut store = create_social_store();
        set_contact(&mut store, "c", &contact("Ann")).unwrap();
        set_persona(&mut store, "p", &PersonaRow::new("Me")).unwrap();

        assert!(link_contact_to_persona(&mut store, "c", "nobody").unwrap_err().is_not_found());
        assert!(link_contact_to_persona(&mut store, "x", "p").unwrap_err().is_not_found());
        link_contact_to_persona(&mut store, "c", "p").unwrap();
        assert_eq!(get_contact(&store, "c").unwrap().linked_persona, "p");
    }
}
