// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::{PersistenceKind, RuntimePlatform};
use crate::entry::FileEntry;
use crate::error::Result;
use crate::path::{DirectoryPath, FilePath};
use async_trait::async_trait;
use serde::Serialize;

/// Uniform file access over every storage backend.
///
/// Contract shared by all implementations:
/// - `read_file` of a missing path, or of a directory, is `NotFound`.
/// - `readdir` of a missing path is `NotFound`; of a file, `NotADirectory`.
///   Only immediate children are returned.
/// - `mkdir` is recursive and succeeds when the directory exists.
/// - `rm` is recursive and succeeds when the path is absent.
/// - `exists` never fails.
#[async_trait]
pub trait FilesystemDriver: Send + Sync {
    async fn read_file(&self, path: &FilePath) -> Result<Vec<u8>>;

    /// Replace the whole content of `path`. The parent directory must
    /// exist, except on the persisted backend, which creates it.
    async fn write_file(&self, path: &FilePath, data: &[u8]) -> Result<()>;

    async fn readdir(&self, path: &DirectoryPath) -> Result<Vec<FileEntry>>;

    async fn stat(&self, path: &FilePath) -> Result<FileEntry>;

    async fn mkdir(&self, path: &DirectoryPath) -> Result<()>;

    async fn rm(&self, path: &FilePath) -> Result<()>;

    async fn exists(&self, path: &FilePath) -> bool;

    /// Describe the backend for diagnostics.
    fn backend_info(&self) -> BackendInfo;
}

/// What a driver is and where its data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfo {
    pub platform: RuntimePlatform,
    pub adapter: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
}

impl std::fmt::Display for BackendInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.adapter, self.platform)?;
        if let Some(p) = &self.persistence {
            write!(f, " persistence={p}")?;
        }
        if let Some(dir) = &self.base_dir {
            write!(f, " base={dir}")?;
        }
        Ok(())
    }
}
