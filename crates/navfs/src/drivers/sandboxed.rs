// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Driver for sandboxed desktop shells.
//!
//! The process cannot touch the host filesystem itself; a [`SandboxHost`]
//! performs each operation on its behalf inside a base directory. Callers
//! see a `/`-rooted virtual namespace mapped onto that directory.

use crate::config::RuntimePlatform;
use crate::context::EventBus;
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::entry::{FileEntry, WatchEvent, WatchEventType};
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath, normalize_virtual};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnostics::{log_debug, log_info};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::sync::OnceCell;

/// Entry as reported by the host, with a host path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub mtime: Option<DateTime<Utc>>,
}

/// Commands the desktop host exposes. All paths are host paths inside
/// the base directory.
#[async_trait]
pub trait SandboxHost: Send + Sync {
    /// Directory every virtual path is resolved against.
    async fn base_dir(&self) -> io::Result<PathBuf>;

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write a file into an existing directory.
    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    async fn readdir(&self, path: &Path) -> io::Result<Vec<HostEntry>>;

    async fn stat(&self, path: &Path) -> io::Result<HostEntry>;

    async fn mkdir(&self, path: &Path) -> io::Result<()>;

    /// Remove recursively; absent paths are not an error.
    async fn rm(&self, path: &Path) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// Host commands implemented directly with `tokio::fs` under a root.
#[derive(Debug, Clone)]
pub struct HostDirSandbox {
    root: PathBuf,
}

impl HostDirSandbox {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

async fn host_entry(path: &Path) -> io::Result<HostEntry> {
    let meta = tokio::fs::metadata(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());
    Ok(HostEntry {
        name,
        path: path.to_path_buf(),
        is_directory: meta.is_dir(),
        size: if meta.is_dir() { None } else { Some(meta.len()) },
        mtime: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

#[async_trait]
impl SandboxHost for HostDirSandbox {
    async fn base_dir(&self) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::canonicalize(&self.root).await
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }

    async fn readdir(&self, path: &Path) -> io::Result<Vec<HostEntry>> {
        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        while let Some(item) = reader.next_entry().await? {
            match host_entry(&item.path()).await {
                Ok(entry) => entries.push(entry),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<HostEntry> {
        host_entry(path).await
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn rm(&self, path: &Path) -> io::Result<()> {
        let meta = match tokio::fs::symlink_metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if meta.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        }
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }
}

/// Virtual-path driver over a [`SandboxHost`].
pub struct SandboxedDriver<H: SandboxHost> {
    host: H,
    base: OnceCell<PathBuf>,
    bus: Option<EventBus>,
}

impl<H: SandboxHost> SandboxedDriver<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            base: OnceCell::new(),
            bus: None,
        }
    }

    /// Announce mutations on `bus` so a bus watcher can observe them.
    #[must_use]
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Base directory, asked of the host once.
    async fn base(&self) -> Result<&PathBuf> {
        self.base
            .get_or_try_init(|| async {
                let base = self
                    .host
                    .base_dir()
                    .await
                    .map_err(|e| Error::host("/", e.to_string()))?;
                let shown = base.display().to_string();
                log_info!("sandboxed filesystem rooted at {base}", base: shown);
                Ok::<PathBuf, Error>(base)
            })
            .await
    }

    /// Map a virtual path into the base directory, refusing escapes.
    async fn to_host(&self, virtual_path: &str) -> Result<(String, PathBuf)> {
        let key = normalize_virtual(virtual_path);
        let mut host = self.base().await?.clone();
        for component in Path::new(&key).components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => host.push(part),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(Error::invalid_path(virtual_path, "path escapes the sandbox"));
                }
            }
        }
        Ok((key, host))
    }

    fn to_virtual(base: &Path, host: &Path) -> String {
        match host.strip_prefix(base) {
            Ok(rel) => {
                let parts: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", parts.join("/"))
            }
            Err(_) => host.to_string_lossy().into_owned(),
        }
    }

    fn entry(&self, base: &Path, host: HostEntry) -> FileEntry {
        let path = FilePath::new_unchecked(Self::to_virtual(base, &host.path));
        FileEntry {
            name: if host.name.is_empty() { path.name() } else { host.name },
            path,
            is_directory: host.is_directory,
            size: host.size,
            mtime: host.mtime,
        }
    }

    fn publish(&self, kind: WatchEventType, key: &str) {
        if let Some(bus) = &self.bus {
            bus.publish(&WatchEvent::new(kind, FilePath::new_unchecked(key)));
        }
    }
}

#[async_trait]
impl<H: SandboxHost> FilesystemDriver for SandboxedDriver<H> {
    async fn read_file(&self, path: &FilePath) -> Result<Vec<u8>> {
        let (key, host) = self.to_host(path.as_str()).await?;
        match self.host.read_file(&host).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => Err(Error::not_found(&key)),
            Err(e) => Err(Error::from_io(&key, e)),
        }
    }

    async fn write_file(&self, path: &FilePath, data: &[u8]) -> Result<()> {
        let (key, host) = self.to_host(path.as_str()).await?;
        let existed = self.host.exists(&host).await.unwrap_or(false);
        match self.host.write_file(&host, data).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => return Err(Error::not_a_file(&key)),
            Err(e) => return Err(Error::from_io(&key, e)),
        }
        let kind = if existed {
            WatchEventType::Modified
        } else {
            WatchEventType::Created
        };
        self.publish(kind, &key);
        Ok(())
    }

    async fn readdir(&self, path: &DirectoryPath) -> Result<Vec<FileEntry>> {
        let (key, host) = self.to_host(path.as_str()).await?;
        log_debug!("sandbox readdir {path}", path: key.as_str());
        let base = self.base().await?;
        let entries = self
            .host
            .readdir(&host)
            .await
            .map_err(|e| Error::from_io(&key, e))?;
        Ok(entries.into_iter().map(|e| self.entry(base, e)).collect())
    }

    async fn stat(&self, path: &FilePath) -> Result<FileEntry> {
        let (key, host) = self.to_host(path.as_str()).await?;
        let base = self.base().await?;
        let entry = self
            .host
            .stat(&host)
            .await
            .map_err(|e| Error::from_io(&key, e))?;
        Ok(self.entry(base, entry))
    }

    async fn mkdir(&self, path: &DirectoryPath) -> Result<()> {
        let (key, host) = self.to_host(path.as_str()).await?;
        let existed = self.host.exists(&host).await.unwrap_or(false);
        self.host
            .mkdir(&host)
            .await
            .map_err(|e| Error::from_io(&key, e))?;
        if !existed {
            self.publish(WatchEventType::Created, &key);
        }
        Ok(())
    }

    /// Remove a file or directory tree. Removing `/` empties the sandbox
    /// but keeps its base directory.
    async fn rm(&self, path: &FilePath) -> Result<()> {
        let (key, host) = self.to_host(path.as_str()).await?;
        if key == "/" {
            let children = self
                .host
                .readdir(&host)
                .await
                .map_err(|e| Error::from_io(&key, e))?;
            for child in &children {
                match self.host.rm(&child.path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::from_io(&key, e)),
                }
            }
            if !children.is_empty() {
                self.publish(WatchEventType::Deleted, &key);
            }
            return Ok(());
        }
        let existed = self.host.exists(&host).await.unwrap_or(false);
        match self.host.rm(&host).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::from_io(&key, e)),
        }
        if existed {
            self.publish(WatchEventType::Deleted, &key);
        }
        Ok(())
    }

    async fn exists(&self, path: &FilePath) -> bool {
        match self.to_host(path.as_str()).await {
            Ok((_, host)) => self.host.exists(&host).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            platform: RuntimePlatform::Desktop,
            adapter: "sandboxed",
            persistence: None,
            base_dir: self.base.get().map(|b| b.display().to_string()),
        }
    }
}
