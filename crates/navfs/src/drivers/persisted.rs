// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Driver for runtimes without a host filesystem.
//!
//! All nodes live in one table shared through the [`FsContext`]; every
//! driver created from the same context sees the same data. The table is
//! loaded on first use, saved after every mutation, and each change is
//! published on the context's event bus.

use super::persister::{Persister, select_persister};
use super::tree::{VirtualNode, VirtualTree};
use crate::config::{FsConfig, PersistenceKind};
use crate::context::{ContextShared, EventBus, FsContext};
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::entry::{FileEntry, WatchEvent, WatchEventType};
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath, normalize_virtual};
use async_trait::async_trait;
use diagnostics::{log_debug, log_info};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const SEED_DIRECTORIES: &[&str] = &["/src", "/tests/fixtures/sample-files"];

const SEED_FILES: &[(&str, &str)] = &[
    ("/README.md", "# naveditor\nDemo filesystem"),
    ("/notes.txt", "Type commands in the shell to navigate or edit files."),
    ("/src/index.ts", "export const hello = () => \"world\";"),
    ("/tests/fixtures/sample-files/hello.txt", "Hello, World!"),
];

fn seed(tree: &mut VirtualTree) -> Result<()> {
    for dir in SEED_DIRECTORIES {
        let _ = tree.mkdir(dir)?;
    }
    for (path, content) in SEED_FILES {
        let _ = tree.write_creating_parents(path, content.as_bytes())?;
    }
    Ok(())
}

/// Loaded table plus the persister it came from.
pub struct PersistedStorage {
    tree: Mutex<VirtualTree>,
    persister: Box<dyn Persister>,
}

impl PersistedStorage {
    pub(crate) async fn open(config: &FsConfig) -> Result<Self> {
        let persister = select_persister(config).await;
        let mut tree = VirtualTree::from_nodes(persister.load().await?);
        if tree.is_empty() && config.seed_demo_content {
            log_info!("seeding empty persisted filesystem");
            seed(&mut tree)?;
        }
        persister.save(tree.nodes()).await?;
        Ok(Self {
            tree: Mutex::new(tree),
            persister,
        })
    }

    #[must_use]
    pub fn kind(&self) -> PersistenceKind {
        self.persister.kind()
    }

    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.persister.location()
    }

    /// Write the current table to storage.
    pub async fn flush(&self) -> Result<()> {
        let tree = self.tree.lock().await;
        self.persister.save(tree.nodes()).await
    }

    /// Re-read storage, replacing the in-memory table.
    ///
    /// Returns true when anything changed.
    pub async fn reload(&self) -> Result<bool> {
        let loaded = VirtualTree::from_nodes(self.persister.load().await?);
        let mut tree = self.tree.lock().await;
        if *tree == loaded {
            return Ok(false);
        }
        *tree = loaded;
        Ok(true)
    }

    /// Run a mutation and save the result while still holding the lock.
    async fn mutate<F>(&self, op: F) -> Result<Vec<WatchEvent>>
    where
        F: FnOnce(&mut VirtualTree) -> Result<Vec<WatchEvent>>,
    {
        let mut tree = self.tree.lock().await;
        let changes = op(&mut tree)?;
        if !changes.is_empty() {
            self.persister.save(tree.nodes()).await?;
        }
        Ok(changes)
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> BTreeMap<String, VirtualNode> {
        self.tree.lock().await.nodes().clone()
    }
}

/// Filesystem driver over [`PersistedStorage`].
///
/// Unlike the other backends, `write_file` creates missing parent
/// directories and announces each one as `Created`.
pub struct PersistedDriver {
    shared: Arc<ContextShared>,
}

impl PersistedDriver {
    #[must_use]
    pub fn new(ctx: &FsContext) -> Self {
        Self {
            shared: ctx.shared(),
        }
    }

    async fn storage(&self) -> Result<Arc<PersistedStorage>> {
        self.shared.persisted_storage().await
    }

    fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    fn publish(&self, changes: &[WatchEvent]) {
        for change in changes {
            self.bus().publish(change);
        }
    }

    /// Pick up changes made to storage by another process.
    ///
    /// Publishes a single `Modified` event for `/` when anything changed.
    pub async fn reload(&self) -> Result<bool> {
        let changed = self.storage().await?.reload().await?;
        if changed {
            log_debug!("persisted filesystem changed on reload");
            self.bus().publish(&WatchEvent::new(
                WatchEventType::Modified,
                FilePath::new_unchecked("/"),
            ));
        }
        Ok(changed)
    }
}

#[async_trait]
impl FilesystemDriver for PersistedDriver {
    async fn read_file(&self, path: &FilePath) -> Result<Vec<u8>> {
        let key = normalize_virtual(path.as_str());
        self.storage().await?.tree.lock().await.read(&key)
    }

    async fn write_file(&self, path: &FilePath, data: &[u8]) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let changes = self
            .storage()
            .await?
            .mutate(|tree| tree.write_creating_parents(&key, data))
            .await?;
        self.publish(&changes);
        Ok(())
    }

    async fn readdir(&self, path: &DirectoryPath) -> Result<Vec<FileEntry>> {
        let key = normalize_virtual(path.as_str());
        self.storage().await?.tree.lock().await.readdir(&key)
    }

    async fn stat(&self, path: &FilePath) -> Result<FileEntry> {
        let key = normalize_virtual(path.as_str());
        self.storage()
            .await?
            .tree
            .lock()
            .await
            .entry(&key)
            .ok_or_else(|| Error::not_found(&key))
    }

    async fn mkdir(&self, path: &DirectoryPath) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let changes = self.storage().await?.mutate(|tree| tree.mkdir(&key)).await?;
        self.publish(&changes);
        Ok(())
    }

    async fn rm(&self, path: &FilePath) -> Result<()> {
        let key = normalize_virtual(path.as_str());
        let changes = self
            .storage()
            .await?
            .mutate(|tree| Ok(tree.rm(&key)))
            .await?;
        self.publish(&changes);
        Ok(())
    }

    async fn exists(&self, path: &FilePath) -> bool {
        let key = normalize_virtual(path.as_str());
        match self.storage().await {
            Ok(storage) => storage.tree.lock().await.exists(&key),
            Err(_) => false,
        }
    }

    fn backend_info(&self) -> BackendInfo {
        let persisted = self.shared.persisted_storage_if_ready();
        BackendInfo {
            platform: self.shared.env.platform,
            adapter: "persisted-store",
            persistence: persisted.as_ref().map(|s| s.kind()),
            base_dir: persisted.and_then(|s| s.location()),
        }
    }
}
