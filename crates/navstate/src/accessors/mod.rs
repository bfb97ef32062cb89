// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Typed, validating access to store tables.
//!
//! Reads tolerate bad data: a row that fails validation is logged and
//! treated as absent. Writes do not: invalid input is an error and nothing
//! is stored.

pub mod activities;
pub mod buffers;
pub mod contacts;
pub mod entries;
pub mod file_sync_state;
pub mod groups;
pub mod memberships;
pub mod personas;
pub mod sync_roots;

use crate::error::{Result, StateError, format_issues};
use crate::schema::{FieldSpec, ValidationIssue, validate_row};
use crate::store::{Cell, Row, Store};
use diagnostics::log_warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// A row type bound to one table.
pub trait Entity: Serialize + DeserializeOwned {
    const TABLE: &'static str;
    const FIELDS: &'static [FieldSpec];

    /// Constraints the field schema cannot express.
    fn check(&self) -> Vec<ValidationIssue> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadContext {
    Get,
    List,
}

impl fmt::Display for ReadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadContext::Get => "get",
            ReadContext::List => "list",
        })
    }
}

/// Validate a stored row and decode it.
pub fn parse_row<E: Entity>(row: &Row) -> std::result::Result<E, Vec<ValidationIssue>> {
    let row = validate_row(E::FIELDS, row)?;
    let value = serde_json::to_value(&row).map_err(|e| vec![ValidationIssue::root(e.to_string())])?;
    let entity: E =
        serde_json::from_value(value).map_err(|e| vec![ValidationIssue::root(e.to_string())])?;
    let issues = entity.check();
    if issues.is_empty() {
        Ok(entity)
    } else {
        Err(issues)
    }
}

/// Encode and validate an entity for storage.
pub fn to_row<E: Entity>(id: &str, entity: &E) -> Result<Row> {
    let serde_json::Value::Object(map) = serde_json::to_value(entity)? else {
        return Err(StateError::invalid_input(format!(
            "{} row {id} is not an object",
            E::TABLE
        )));
    };
    let row: Row = map
        .iter()
        .filter_map(|(k, v)| Cell::from_json(v).map(|c| (k.clone(), c)))
        .collect();
    let row = validate_row(E::FIELDS, &row).map_err(|i| StateError::validation(E::TABLE, id, i))?;
    let issues = entity.check();
    if !issues.is_empty() {
        return Err(StateError::validation(E::TABLE, id, issues));
    }
    Ok(row)
}

fn decode<E: Entity>(id: &str, row: &Row, context: ReadContext) -> Option<E> {
    match parse_row(row) {
        Ok(entity) => Some(entity),
        Err(issues) => {
            let table = E::TABLE;
            let context = context.to_string();
            let issues = format_issues(&issues);
            log_warn!(
                "dropping invalid {table} row during {context} for id={id}: {issues}",
                table: table,
                context: context,
                id: id,
                issues: issues
            );
            None
        }
    }
}

pub(crate) fn read<E: Entity>(store: &Store, id: &str) -> Option<E> {
    let row = store.get_row(E::TABLE, id)?;
    decode(id, row, ReadContext::Get)
}

pub(crate) fn list<E: Entity>(store: &Store) -> Vec<(String, E)> {
    store
        .rows(E::TABLE)
        .filter_map(|(id, row)| decode(id, row, ReadContext::List).map(|e| (id.to_string(), e)))
        .collect()
}

pub(crate) fn write<E: Entity>(store: &mut Store, id: &str, entity: &E) -> Result<()> {
    let row = to_row(id, entity)?;
    store.set_row(E::TABLE, id, row)
}

/// Deserialize an empty string as `None`.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
