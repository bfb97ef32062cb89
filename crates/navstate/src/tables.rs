// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table and value names, and store construction.

use crate::accessors::activities::ACTIVITY_FIELDS;
use crate::accessors::buffers::BUFFER_FIELDS;
use crate::accessors::contacts::CONTACT_FIELDS;
use crate::accessors::entries::ENTRY_FIELDS;
use crate::accessors::file_sync_state::FILE_SYNC_STATE_FIELDS;
use crate::accessors::groups::GROUP_FIELDS;
use crate::accessors::memberships::MEMBERSHIP_FIELDS;
use crate::accessors::personas::PERSONA_FIELDS;
use crate::accessors::sync_roots::SYNC_ROOT_FIELDS;
use crate::schema::{CellType, FieldSpec};
use crate::store::{Cell, Store};
use diagnostics::{log_info, log_warn};

pub const ENTRIES_TABLE: &str = "entries";
pub const BUFFERS_TABLE: &str = "buffers";
pub const PERSONAS_TABLE: &str = "personas";
pub const CONTACTS_TABLE: &str = "contacts";
pub const GROUPS_TABLE: &str = "groups";
pub const MEMBERSHIPS_TABLE: &str = "memberships";
pub const ACTIVITIES_TABLE: &str = "activities";
pub const SYNC_ROOTS_TABLE: &str = "sync_roots";
pub const FILE_SYNC_STATE_TABLE: &str = "file_sync_state";

pub const DEFAULT_PERSONA_ID_VALUE: &str = "defaultPersonaId";
pub const SCHEMA_VERSION_VALUE: &str = "schemaVersion";

/// Version of the social tables this build understands.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Outcome of [`add_social_tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// The store was already at the current version.
    Current,
    /// No version was recorded; it is now the current one.
    Initialized,
    /// Written by a newer build. Tables, values and cells this build does
    /// not know are kept but ignored.
    Newer(u32),
}

/// A store with the file tree and editor buffer tables.
#[must_use]
pub fn create_store() -> Store {
    let mut store = Store::new();
    register_core_tables(&mut store);
    store
}

/// [`create_store`] plus the social tables.
#[must_use]
pub fn create_social_store() -> Store {
    let mut store = create_store();
    let _ = add_social_tables(&mut store);
    store
}

fn stored_version(store: &Store) -> f64 {
    store
        .get_value(SCHEMA_VERSION_VALUE)
        .and_then(Cell::as_number)
        .unwrap_or(0.0)
}

/// Register table schemas. Rows written by a newer build keep every cell
/// until they are rewritten, so saving such a store loses nothing.
fn register_tables(store: &mut Store, tables: &[(&str, &'static [FieldSpec])]) {
    let newer = stored_version(store) > f64::from(CURRENT_SCHEMA_VERSION);
    for (table, fields) in tables {
        if newer {
            store.register_table_schema(table, fields);
        } else {
            store.set_table_schema(table, fields);
        }
    }
}

pub(crate) fn register_core_tables(store: &mut Store) {
    register_tables(store, &[(ENTRIES_TABLE, ENTRY_FIELDS), (BUFFERS_TABLE, BUFFER_FIELDS)]);
}

/// Register the social tables and values, and reconcile the schema version.
///
/// An absent or zero version is set to [`CURRENT_SCHEMA_VERSION`]. A newer
/// version is left alone and reported; this never fails.
pub fn add_social_tables(store: &mut Store) -> SchemaStatus {
    register_tables(
        store,
        &[
            (PERSONAS_TABLE, PERSONA_FIELDS),
            (CONTACTS_TABLE, CONTACT_FIELDS),
            (GROUPS_TABLE, GROUP_FIELDS),
            (MEMBERSHIPS_TABLE, MEMBERSHIP_FIELDS),
            (ACTIVITIES_TABLE, ACTIVITY_FIELDS),
            (SYNC_ROOTS_TABLE, SYNC_ROOT_FIELDS),
            (FILE_SYNC_STATE_TABLE, FILE_SYNC_STATE_FIELDS),
        ],
    );

    let found = stored_version(store);

    store.set_value_schema(DEFAULT_PERSONA_ID_VALUE, CellType::String, Cell::from(""));
    store.set_value_schema(
        SCHEMA_VERSION_VALUE,
        CellType::Number,
        Cell::Number(f64::from(CURRENT_SCHEMA_VERSION)),
    );

    let current = f64::from(CURRENT_SCHEMA_VERSION);
    if found <= 0.0 {
        let _ = store.set_value(SCHEMA_VERSION_VALUE, current);
        log_info!("initialized store schema version {current}", current: CURRENT_SCHEMA_VERSION);
        SchemaStatus::Initialized
    } else if found > current {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let found = found as u32;
        log_warn!(
            "store schema version {found} is newer than supported {current}; unknown tables and values are ignored",
            found: found,
            current: CURRENT_SCHEMA_VERSION
        );
        SchemaStatus::Newer(found)
    } else {
        SchemaStatus::Current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_is_initialized() {
        let mut store = create_store();
        assert_eq!(add_social_tables(&mut store), SchemaStatus::Initialized);
        assert_eq!(store.get_value(SCHEMA_VERSION_VALUE), Some(&Cell::Number(1.0)));
        assert_eq!(store.get_value(DEFAULT_PERSONA_ID_VALUE), Some(&Cell::from("")));
        assert_eq!(add_social_tables(&mut store), SchemaStatus::Current);
    }

    #[test]
    fn test_zero_version_is_initialized() {
        let mut store = create_store();
        store.set_value(SCHEMA_VERSION_VALUE, 0.0).unwrap();
        assert_eq!(add_social_tables(&mut store), SchemaStatus::Initialized);
    }

    #[test]
    fn test_newer_version_is_kept() {
        let mut store = create_store();
        store.set_value(SCHEMA_VERSION_VALUE, 7.0).unwrap();
        store.set_cell("future_table", "x", "cell", "kept").unwrap();

        assert_eq!(add_social_tables(&mut store), SchemaStatus::Newer(7));
        assert_eq!(store.get_value(SCHEMA_VERSION_VALUE), Some(&Cell::Number(7.0)));
        assert!(store.has_row("future_table", "x"));
    }

    #[test]
    fn test_newer_version_keeps_unknown_cells() {
        let mut store = Store::new();
        store.set_value(SCHEMA_VERSION_VALUE, 2.0).unwrap();
        store.set_cell(PERSONAS_TABLE, "persona_1", "name", "Ann").unwrap();
        store.set_cell(PERSONAS_TABLE, "persona_1", "futureField", "keep me").unwrap();
        store.set_cell(ENTRIES_TABLE, "/a", "futureField", "also kept").unwrap();

        register_core_tables(&mut store);
        assert_eq!(add_social_tables(&mut store), SchemaStatus::Newer(2));

        assert_eq!(
            store.get_cell(PERSONAS_TABLE, "persona_1", "futureField"),
            Some(&Cell::from("keep me"))
        );
        assert!(store.has_row(ENTRIES_TABLE, "/a"));
        let persona = crate::accessors::personas::get_persona(&store, "persona_1").unwrap();
        assert_eq!(persona.name, "Ann");
    }

    #[test]
    fn test_current_version_coerces_rows() {
        let mut store = Store::new();
        store.set_value(SCHEMA_VERSION_VALUE, 1.0).unwrap();
        store.set_cell(PERSONAS_TABLE, "persona_1", "name", "Ann").unwrap();
        store.set_cell(PERSONAS_TABLE, "persona_1", "stray", "dropped").unwrap();

        assert_eq!(add_social_tables(&mut store), SchemaStatus::Current);
        assert_eq!(store.get_cell(PERSONAS_TABLE, "persona_1", "stray"), None);
    }

    #[test]
    fn test_schemas_registered() {
        let store = create_social_store();
        for table in [
            ENTRIES_TABLE,
            BUFFERS_TABLE,
            PERSONAS_TABLE,
            CONTACTS_TABLE,
            GROUPS_TABLE,
            MEMBERSHIPS_TABLE,
            ACTIVITIES_TABLE,
            SYNC_ROOTS_TABLE,
            FILE_SYNC_STATE_TABLE,
        ] {
            assert!(store.table_schema(table).is_some(), "{table}");
        }
    }
}
