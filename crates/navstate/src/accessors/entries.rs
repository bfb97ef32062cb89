// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cached file tree rows, keyed by path.

use super::{Entity, list, read, write};
use crate::error::Result;
use crate::schema::FieldSpec;
use crate::store::Store;
use crate::tables::ENTRIES_TABLE;
use chrono::SecondsFormat;
use navfs::FileEntry;
use navfs::path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeRow {
    pub path: String,
    pub name: String,
    /// Containing directory, without a trailing separator except at `/`.
    pub parent_path: String,
    pub is_directory: bool,
    pub size: u64,
    /// RFC 3339, or empty when the backend does not report it.
    pub mtime: String,
}

impl From<&FileEntry> for FileTreeRow {
    fn from(entry: &FileEntry) -> Self {
        let path = entry.path.to_string();
        Self {
            parent_path: path::parent(&path).unwrap_or_default(),
            name: entry.name.clone(),
            is_directory: entry.is_directory,
            size: entry.size.unwrap_or(0),
            mtime: entry
                .mtime
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            path,
        }
    }
}

pub const ENTRY_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("path"),
    FieldSpec::non_empty("name"),
    FieldSpec::text("parentPath"),
    FieldSpec::boolean("isDirectory", false),
    FieldSpec::number("size", 0.0),
    FieldSpec::text("mtime"),
];

impl Entity for FileTreeRow {
    const TABLE: &'static str = ENTRIES_TABLE;
    const FIELDS: &'static [FieldSpec] = ENTRY_FIELDS;
}

#[must_use]
pub fn get_entry(store: &Store, id: &str) -> Option<FileTreeRow> {
    read(store, id)
}

pub fn set_entry(store: &mut Store, id: &str, entry: &FileTreeRow) -> Result<()> {
    write(store, id, entry)
}

#[must_use]
pub fn list_entries(store: &Store) -> Vec<(String, FileTreeRow)> {
    list(store)
}

pub fn delete_entry(store: &mut Store, id: &str) {
    let _ = store.del_row(ENTRIES_TABLE, id);
}

/// Rows whose `parentPath` is `dir`.
#[must_use]
pub fn list_children(store: &Store, dir: &str) -> Vec<(String, FileTreeRow)> {
    let key = directory_key(dir);
    list_entries(store)
        .into_iter()
        .filter(|(_, row)| row.parent_path == key)
        .collect()
}

/// Make the cached children of `dir` exactly `entries`.
///
/// Returns the number of rows written. Rows for children that are no
/// longer listed are removed along with everything cached beneath them.
pub fn mirror_directory(store: &mut Store, dir: &str, entries: &[FileEntry]) -> Result<usize> {
    let rows: Vec<FileTreeRow> = entries.iter().map(FileTreeRow::from).collect();
    let stale: Vec<String> = list_children(store, dir)
        .into_iter()
        .map(|(id, _)| id)
        .filter(|id| !rows.iter().any(|r| &r.path == id))
        .collect();
    for id in stale {
        forget_subtree(store, &id);
    }
    for row in &rows {
        set_entry(store, &row.path, row)?;
    }
    Ok(rows.len())
}

/// Remove the row for `path_key` and every cached row below it.
pub fn forget_subtree(store: &mut Store, path_key: &str) {
    let key = directory_key(path_key);
    let prefix = if key == "/" {
        key.clone()
    } else {
        format!("{key}/")
    };
    let doomed: Vec<String> = store
        .row_ids(ENTRIES_TABLE)
        .into_iter()
        .filter(|id| *id == key || id.starts_with(&prefix))
        .collect();
    for id in doomed {
        let _ = store.del_row(ENTRIES_TABLE, &id);
    }
}

fn directory_key(dir: &str) -> String {
    let trimmed = dir.trim_end_matches(path::SEPARATOR);
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
