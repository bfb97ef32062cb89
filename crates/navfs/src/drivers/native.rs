// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::RuntimePlatform;
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::path::{self, DirectoryPath, FilePath};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnostics::log_debug;
use std::io;
use std::path::Path;

/// Host filesystem access through `tokio::fs`. Paths are host paths.
///
/// `write_file` fails with `NotFound` when the parent directory is missing.
#[derive(Debug, Default, Clone)]
pub struct NativeDriver;

impl NativeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn entry_from_metadata(path: FilePath, meta: &std::fs::Metadata) -> FileEntry {
    let mtime = meta.modified().ok().map(DateTime::<Utc>::from);
    if meta.is_dir() {
        FileEntry::directory(path, mtime)
    } else {
        FileEntry::file(path, meta.len(), mtime)
    }
}

async fn stat_host(display: &str, host: &Path) -> Result<FileEntry> {
    let meta = tokio::fs::metadata(host)
        .await
        .map_err(|e| Error::from_io(display, e))?;
    Ok(entry_from_metadata(FilePath::new_unchecked(display), &meta))
}

#[async_trait]
impl FilesystemDriver for NativeDriver {
    async fn read_file(&self, path: &FilePath) -> Result<Vec<u8>> {
        let p = path.as_str();
        log_debug!("native read {path}", path: p);
        match tokio::fs::read(p).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => Err(Error::not_found(p)),
            Err(e) => Err(Error::from_io(p, e)),
        }
    }

    async fn write_file(&self, path: &FilePath, data: &[u8]) -> Result<()> {
        let p = path.as_str();
        let size = data.len();
        log_debug!("native write {path} ({size} bytes)", path: p, size: size);
        match tokio::fs::write(p, data).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => Err(Error::not_a_file(p)),
            Err(e) => Err(Error::from_io(p, e)),
        }
    }

    async fn readdir(&self, path: &DirectoryPath) -> Result<Vec<FileEntry>> {
        let dir = path.as_str();
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::from_io(dir, e))?;

        let mut children = Vec::new();
        while let Some(item) = reader.next_entry().await.map_err(|e| Error::from_io(dir, e))? {
            let name = item.file_name().to_string_lossy().into_owned();
            children.push((path::join(dir, &name), item.path()));
        }

        let stats = futures::future::join_all(
            children
                .iter()
                .map(|(display, host)| stat_host(display, host)),
        )
        .await;

        let mut entries = Vec::with_capacity(stats.len());
        for stat in stats {
            match stat {
                Ok(entry) => entries.push(entry),
                // Removed between listing and stat.
                Err(Error::NotFound(gone)) => {
                    log_debug!("native readdir skipped {gone}", gone: gone);
                }
                Err(e) => return Err(e),
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &FilePath) -> Result<FileEntry> {
        stat_host(path.as_str(), Path::new(path.as_str())).await
    }

    async fn mkdir(&self, path: &DirectoryPath) -> Result<()> {
        let p = path.as_str();
        tokio::fs::create_dir_all(p)
            .await
            .map_err(|e| Error::from_io(p, e))
    }

    async fn rm(&self, path: &FilePath) -> Result<()> {
        let p = path.as_str();
        let meta = match tokio::fs::symlink_metadata(p).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::from_io(p, e)),
        };
        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(p).await
        } else {
            tokio::fs::remove_file(p).await
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from_io(p, e)),
        }
    }

    async fn exists(&self, path: &FilePath) -> bool {
        tokio::fs::try_exists(path.as_str()).await.unwrap_or(false)
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            platform: RuntimePlatform::Native,
            adapter: "native",
            persistence: None,
            base_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn file(dir: &TempDir, rel: &str) -> FilePath {
        FilePath::new(dir.path().join(rel).to_string_lossy().into_owned()).unwrap()
    }

    fn directory(dir: &TempDir, rel: &str) -> DirectoryPath {
        DirectoryPath::new(dir.path().join(rel).to_string_lossy().into_owned()).unwrap()
    }

    #[tokio::test]
    async fn test_read_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let driver = NativeDriver::new();
        driver.mkdir(&directory(&tmp, "d")).await.unwrap();
        let err = driver.read_file(&file(&tmp, "d")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_readdir_on_file_is_wrong_kind() {
        let tmp = TempDir::new().unwrap();
        let driver = NativeDriver::new();
        driver.write_file(&file(&tmp, "f.txt"), b"x").await.unwrap();
        let err = driver.readdir(&directory(&tmp, "f.txt")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKind);
    }

    #[tokio::test]
    async fn test_stat_reports_size_and_mtime() {
        let tmp = TempDir::new().unwrap();
        let driver = NativeDriver::new();
        let path = file(&tmp, "sized.bin");
        driver.write_file(&path, &[0u8; 17]).await.unwrap();
        let entry = driver.stat(&path).await.unwrap();
        assert_eq!(entry.name, "sized.bin");
        assert_eq!(entry.size, Some(17));
        assert!(entry.mtime.is_some());
        assert!(!entry.is_directory);
    }
}
