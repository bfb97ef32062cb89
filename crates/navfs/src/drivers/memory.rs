// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::tree::VirtualTree;
use crate::config::RuntimePlatform;
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath, normalize_virtual};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Volatile driver for tests and demos.
///
/// `readdir` scans every node for immediate children of the requested
/// directory, which is fine at the scale this driver is used for.
/// Writing a file needs an existing parent directory; `mkdir` creates
/// missing ancestors.
pub struct MemoryDriver {
    tree: Mutex<VirtualTree>,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDriver {
    /// An empty filesystem containing only `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(VirtualTree::new()),
        }
    }

    /// A filesystem pre-populated with files. Keys ending in `/` become
    /// directories.
    pub fn with_seed<I, K, V>(seed: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let mut tree = VirtualTree::new();
        for (key, data) in seed {
            let raw = key.as_ref();
            let key = normalize_virtual(raw);
            if raw.ends_with('/') {
                let _ = tree.mkdir(&key)?;
            } else {
                let _ = tree.write_creating_parents(&key, data.as_ref())?;
            }
        }
        Ok(Self {
            tree: Mutex::new(tree),
        })
    }
}

#[async_trait]
impl FilesystemDriver for MemoryDriver {
    async fn read_file(&self, path: &FilePath) -> Result<Vec<u8>> {
        let key = normalize_virtual(path.as_str());
        self.tree.lock().await.read(&key)
    }

    async fn write_file(&self, path: &FilePath, data: &[u8]) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let _ = self.tree.lock().await.write(&key, data)?;
        Ok(())
    }

    async fn readdir(&self, path: &DirectoryPath) -> Result<Vec<FileEntry>> {
        let key = normalize_virtual(path.as_str());
        self.tree.lock().await.readdir(&key)
    }

    async fn stat(&self, path: &FilePath) -> Result<FileEntry> {
        let key = normalize_virtual(path.as_str());
        self.tree
            .lock()
            .await
            .entry(&key)
            .ok_or_else(|| Error::not_found(&key))
    }

    async fn mkdir(&self, path: &DirectoryPath) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let _ = self.tree.lock().await.mkdir(&key)?;
        Ok(())
    }

    async fn rm(&self, path: &FilePath) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let _ = self.tree.lock().await.rm(&key);
        Ok(())
    }

    async fn exists(&self, path: &FilePath) -> bool {
        let key = normalize_virtual(path.as_str());
        self.tree.lock().await.exists(&key)
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            platform: RuntimePlatform::Native,
            adapter: "memory",
            persistence: None,
            base_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_driver() {
        let driver = MemoryDriver::with_seed([("/docs/", ""), ("/docs/a.md", "# A")]).unwrap();
        let docs = DirectoryPath::new("/docs").unwrap();
        let entries = driver.readdir(&docs).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.md");
        assert_eq!(entries[0].size, Some(3));
    }

    #[tokio::test]
    async fn test_trailing_separator_is_same_directory() {
        let driver = MemoryDriver::new();
        driver.mkdir(&DirectoryPath::new("/d/").unwrap()).await.unwrap();
        assert!(driver.exists(&FilePath::new("/d").unwrap()).await);
        let stat = driver.stat(&FilePath::new("/d/").unwrap()).await.unwrap();
        assert!(stat.is_directory);
    }
}
