// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::path::FilePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of `stat` and `readdir`. Never cached by the drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: FilePath,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<DateTime<Utc>>,
}

impl FileEntry {
    #[must_use]
    pub fn file(path: FilePath, size: u64, mtime: Option<DateTime<Utc>>) -> Self {
        Self {
            name: path.name(),
            path,
            is_directory: false,
            size: Some(size),
            mtime,
        }
    }

    #[must_use]
    pub fn directory(path: FilePath, mtime: Option<DateTime<Utc>>) -> Self {
        Self {
            name: path.name(),
            path,
            is_directory: true,
            size: None,
            mtime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventType {
    Created,
    Modified,
    Deleted,
    Moved,
}

impl std::fmt::Display for WatchEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WatchEventType::Created => "created",
            WatchEventType::Modified => "modified",
            WatchEventType::Deleted => "deleted",
            WatchEventType::Moved => "moved",
        };
        f.write_str(s)
    }
}

/// A change notification delivered to watcher callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    #[serde(rename = "type")]
    pub kind: WatchEventType,
    pub path: FilePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<FilePath>,
    pub timestamp: DateTime<Utc>,
}

impl WatchEvent {
    #[must_use]
    pub fn new(kind: WatchEventType, path: FilePath) -> Self {
        Self {
            kind,
            path,
            old_path: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn moved(from: FilePath, to: FilePath) -> Self {
        Self {
            kind: WatchEventType::Moved,
            path: to,
            old_path: Some(from),
            timestamp: Utc::now(),
        }
    }
}
