// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Local directories bound to a remote pod location.

use super::{Entity, list, read, write};
use crate::error::{Result, StateError};
use crate::schema::{CellType, FieldSpec, ValidationIssue};
use crate::store::Store;
use crate::tables::SYNC_ROOTS_TABLE;
use navfs::DirectoryPath;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRoot {
    /// Row id; not stored as a cell.
    #[serde(skip)]
    pub id: String,
    pub label: String,
    /// Must end with `/`.
    pub local_path: String,
    pub pod_url: String,
    pub web_id: String,
    pub readonly: bool,
    pub enabled: bool,
}

pub const SYNC_ROOT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("label", CellType::String),
    FieldSpec::non_empty("localPath"),
    FieldSpec::non_empty("podUrl"),
    FieldSpec::non_empty("webId"),
    FieldSpec::required("readonly", CellType::Boolean),
    FieldSpec::required("enabled", CellType::Boolean),
];

impl Entity for SyncRoot {
    const TABLE: &'static str = SYNC_ROOTS_TABLE;
    const FIELDS: &'static [FieldSpec] = SYNC_ROOT_FIELDS;

    fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Err(e) = DirectoryPath::new(self.local_path.as_str()) {
            issues.push(ValidationIssue::new("localPath", e.to_string()));
        } else if !self.local_path.ends_with('/') {
            issues.push(ValidationIssue::new(
                "localPath",
                "sync root localPath must end with \"/\"",
            ));
        }
        for (field, value) in [("podUrl", &self.pod_url), ("webId", &self.web_id)] {
            if let Err(e) = Url::parse(value) {
                issues.push(ValidationIssue::new(field, format!("invalid URL: {e}")));
            }
        }
        issues
    }
}

#[must_use]
pub fn get_sync_root(store: &Store, id: &str) -> Option<SyncRoot> {
    read::<SyncRoot>(store, id).map(|root| SyncRoot {
        id: id.to_string(),
        ..root
    })
}

pub fn set_sync_root(store: &mut Store, root: &SyncRoot) -> Result<()> {
    if root.id.is_empty() {
        return Err(StateError::invalid_input("sync root id must not be empty"));
    }
    write(store, &root.id, root)
}

#[must_use]
pub fn list_sync_roots(store: &Store) -> Vec<SyncRoot> {
    list::<SyncRoot>(store)
        .into_iter()
        .map(|(id, root)| SyncRoot { id, ..root })
        .collect()
}

pub fn delete_sync_root(store: &mut Store, id: &str) {
    let _ = store.del_row(SYNC_ROOTS_TABLE, id);
}
