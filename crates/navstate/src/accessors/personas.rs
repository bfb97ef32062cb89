// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The local user's own identities.
//!
//! At most one persona is the default. The default is tracked both by the
//! `isDefault` cell and by the `defaultPersonaId` store value; the
//! operations here keep the two in agreement.

use super::{Entity, list, read, write};
use crate::error::{Result, StateError};
use crate::ids::now_timestamp;
use crate::schema::{CellType, FieldSpec};
use crate::store::{Cell, Store};
use crate::tables::{DEFAULT_PERSONA_ID_VALUE, PERSONAS_TABLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRow {
    pub name: String,
    pub nickname: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub phone: String,
    pub image: String,
    pub bio: String,
    pub homepage: String,
    pub oidc_issuer: String,
    pub inbox: String,
    pub storage: String,
    pub public_type_index: String,
    pub private_type_index: String,
    pub preferences_file: String,
    pub profile_doc: String,
    pub is_default: bool,
    pub updated_at: String,
}

impl PersonaRow {
    /// A persona with just a name, stamped now.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            updated_at: now_timestamp(),
            ..Self::default()
        }
    }
}

pub const PERSONA_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("name"),
    FieldSpec::text("nickname"),
    FieldSpec::text("givenName"),
    FieldSpec::text("familyName"),
    FieldSpec::text("email"),
    FieldSpec::text("phone"),
    FieldSpec::text("image"),
    FieldSpec::text("bio"),
    FieldSpec::text("homepage"),
    FieldSpec::text("oidcIssuer"),
    FieldSpec::text("inbox"),
    FieldSpec::text("storage"),
    FieldSpec::text("publicTypeIndex"),
    FieldSpec::text("privateTypeIndex"),
    FieldSpec::text("preferencesFile"),
    FieldSpec::text("profileDoc"),
    FieldSpec::required("isDefault", CellType::Boolean),
    FieldSpec::required("updatedAt", CellType::String),
];

impl Entity for PersonaRow {
    const TABLE: &'static str = PERSONAS_TABLE;
    const FIELDS: &'static [FieldSpec] = PERSONA_FIELDS;
}

#[must_use]
pub fn get_persona(store: &Store, id: &str) -> Option<PersonaRow> {
    read(store, id)
}

/// Store `persona`. If it is marked default, every other persona loses
/// the flag; if it is not but was the default, there is no default left.
pub fn set_persona(store: &mut Store, id: &str, persona: &PersonaRow) -> Result<()> {
    write(store, id, persona)?;
    if persona.is_default {
        return set_default_persona(store, id);
    }
    if default_persona_id(store).as_deref() == Some(id) {
        store.set_value(DEFAULT_PERSONA_ID_VALUE, "")?;
    }
    Ok(())
}

#[must_use]
pub fn list_personas(store: &Store) -> Vec<(String, PersonaRow)> {
    list(store)
}

pub fn delete_persona(store: &mut Store, id: &str) -> Result<()> {
    let was_default = default_persona_id(store).as_deref() == Some(id);
    let _ = store.del_row(PERSONAS_TABLE, id);
    if was_default {
        store.set_value(DEFAULT_PERSONA_ID_VALUE, "")?;
    }
    Ok(())
}

fn default_persona_id(store: &Store) -> Option<String> {
    store
        .get_value(DEFAULT_PERSONA_ID_VALUE)
        .and_then(Cell::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The default persona, by the stored id or else by the `isDefault` flag.
#[must_use]
pub fn get_default_persona(store: &Store) -> Option<(String, PersonaRow)> {
    if let Some(id) = default_persona_id(store) {
        if let Some(row) = get_persona(store, &id) {
            return Some((id, row));
        }
    }
    list_personas(store).into_iter().find(|(_, row)| row.is_default)
}

/// Make `id` the only default persona.
pub fn set_default_persona(store: &mut Store, id: &str) -> Result<()> {
    if get_persona(store, id).is_none() {
        return Err(StateError::not_found("persona", id));
    }
    for (other, row) in list_personas(store) {
        if row.is_default && other != id {
            store.set_cell(PERSONAS_TABLE, &other, "isDefault", false)?;
        }
    }
    store.set_cell(PERSONAS_TABLE, id, "isDefault", true)?;
    store.set_value(DEFAULT_PERSONA_ID_VALUE, id)
}
