// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::RuntimePlatform;
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath};
use async_trait::async_trait;

/// Placeholder for a backend that does not exist in this runtime.
///
/// Every operation fails with `Unavailable`, never `NotFound`, so callers
/// can tell a missing backend from a missing file.
#[derive(Debug, Clone)]
pub struct UnavailableDriver {
    platform: RuntimePlatform,
    reason: String,
}

impl UnavailableDriver {
    pub fn new<S: Into<String>>(platform: RuntimePlatform, reason: S) -> Self {
        Self {
            platform,
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(Error::unavailable(&self.reason))
    }
}

#[async_trait]
impl FilesystemDriver for UnavailableDriver {
    async fn read_file(&self, _path: &FilePath) -> Result<Vec<u8>> {
        self.fail()
    }

    async fn write_file(&self, _path: &FilePath, _data: &[u8]) -> Result<()> {
        self.fail()
    }

    async fn readdir(&self, _path: &DirectoryPath) -> Result<Vec<FileEntry>> {
        self.fail()
    }

    async fn stat(&self, _path: &FilePath) -> Result<FileEntry> {
        self.fail()
    }

    async fn mkdir(&self, _path: &DirectoryPath) -> Result<()> {
        self.fail()
    }

    async fn rm(&self, _path: &FilePath) -> Result<()> {
        self.fail()
    }

    async fn exists(&self, _path: &FilePath) -> bool {
        false
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            platform: self.platform,
            adapter: "unavailable",
            persistence: None,
            base_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_every_operation_is_unavailable() {
        let driver = UnavailableDriver::new(RuntimePlatform::Worker, "no storage in workers");
        let file = FilePath::new("/a").unwrap();
        let dir = DirectoryPath::root();
        assert_eq!(driver.read_file(&file).await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert_eq!(driver.write_file(&file, b"").await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert_eq!(driver.readdir(&dir).await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert_eq!(driver.stat(&file).await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert_eq!(driver.mkdir(&dir).await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert_eq!(driver.rm(&file).await.unwrap_err().kind(), ErrorKind::Unavailable);
        assert!(!driver.exists(&file).await);
    }
}
