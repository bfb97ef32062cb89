// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-file synchronization status against a sync root, keyed by path.

use super::{Entity, empty_as_none, list, read, write};
use crate::error::Result;
use crate::schema::{FieldSpec, ValidationIssue};
use crate::store::Store;
use crate::tables::FILE_SYNC_STATE_TABLE;
use navfs::AbsolutePath;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Synced,
    PendingUpload,
    PendingDelete,
    Conflict,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncStatus::Synced => "synced",
            SyncStatus::PendingUpload => "pending_upload",
            SyncStatus::PendingDelete => "pending_delete",
            SyncStatus::Conflict => "conflict",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSyncState {
    pub path: String,
    pub sync_root_id: String,
    /// Entity tag last seen on the remote copy.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub pod_etag: Option<String>,
    pub content_hash: String,
    pub status: SyncStatus,
}

pub const FILE_SYNC_STATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("path"),
    FieldSpec::non_empty("syncRootId"),
    FieldSpec::text("podEtag"),
    FieldSpec::non_empty("contentHash"),
    FieldSpec::non_empty("status").one_of(&["synced", "pending_upload", "pending_delete", "conflict"]),
];

impl Entity for FileSyncState {
    const TABLE: &'static str = FILE_SYNC_STATE_TABLE;
    const FIELDS: &'static [FieldSpec] = FILE_SYNC_STATE_FIELDS;

    fn check(&self) -> Vec<ValidationIssue> {
        match AbsolutePath::new(self.path.as_str()) {
            Ok(_) => Vec::new(),
            Err(e) => vec![ValidationIssue::new("path", e.to_string())],
        }
    }
}

/// Hex SHA-256 of `data`.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[must_use]
pub fn get_file_sync_state(store: &Store, path: &str) -> Option<FileSyncState> {
    read(store, path)
}

pub fn set_file_sync_state(store: &mut Store, state: &FileSyncState) -> Result<()> {
    write(store, &state.path, state)
}

pub fn delete_file_sync_state(store: &mut Store, path: &str) {
    let _ = store.del_row(FILE_SYNC_STATE_TABLE, path);
}

#[must_use]
pub fn list_file_sync_states_for_root(store: &Store, root_id: &str) -> Vec<FileSyncState> {
    list::<FileSyncState>(store)
        .into_iter()
        .map(|(_, state)| state)
        .filter(|state| state.sync_root_id == root_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;
    use crate::tables::create_social_store;

    fn state(path: &str, root: &str, etag: Option<&str>) -> FileSyncState {
        FileSyncState {
            path: path.into(),
            sync_root_id: root.into(),
            pod_etag: etag.map(str::to_string),
            content_hash: content_hash(path.as_bytes()),
            status: SyncStatus::PendingUpload,
        }
    }

    #[test]
    fn test_hash() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_etag_is_stored_empty() {
        let mut store = create_social_store();
        set_file_sync_state(&mut store, &state("/a.txt", "r1", None)).unwrap();
        assert_eq!(
            store.get_cell(FILE_SYNC_STATE_TABLE, "/a.txt", "podEtag"),
            Some(&Cell::from(""))
        );
        assert_eq!(get_file_sync_state(&store, "/a.txt"), Some(state("/a.txt", "r1", None)));
        assert_eq!(
            store.get_cell(FILE_SYNC_STATE_TABLE, "/a.txt", "status"),
            Some(&Cell::from("pending_upload"))
        );
    }

    #[test]
    fn test_list_for_root() {
        let mut store = create_social_store();
        set_file_sync_state(&mut store, &state("/a", "r1", Some("\"e1\""))).unwrap();
        set_file_sync_state(&mut store, &state("/b", "r2", None)).unwrap();
        set_file_sync_state(&mut store, &state("/c", "r1", None)).unwrap();

        let paths: Vec<String> = list_file_sync_states_for_root(&store, "r1")
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(paths, vec!["/a", "/c"]);

        delete_file_sync_state(&mut store, "/a");
        assert_eq!(list_file_sync_states_for_root(&store, "r1").len(), 1);
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let mut store = create_social_store();
        assert!(set_file_sync_state(&mut store, &state("a.txt", "r1", None)).is_err());
    }
}
