// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Storage behind the persisted driver.
//!
//! Three persisters are tried in order, each falling back to the next when
//! it cannot be used: a single JSON document, one file per row, and plain
//! memory. The first that passes its availability check wins.

use super::tree::VirtualNode;
use crate::config::{FsConfig, PersistenceKind};
use crate::error::{Error, Result};
use crate::path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnostics::{log_debug, log_info, log_warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

const DOCUMENT_FILE: &str = "filesystem.json";
const ROWS_DIR: &str = "rows";
const CHECK_FILE: &str = ".write-check";
const DOCUMENT_VERSION: u32 = 1;

/// One persisted node. Content is hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRow {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    #[serde(default)]
    pub data: String,
}

impl StoredRow {
    fn from_node(key: &str, node: &VirtualNode) -> Self {
        Self {
            name: path::basename(key),
            is_directory: node.is_directory,
            size: node.data.len() as u64,
            mtime: node.mtime,
            data: hex::encode(&node.data),
        }
    }

    fn into_node(self, key: &str) -> Result<VirtualNode> {
        let data = hex::decode(&self.data)
            .map_err(|e| Error::persistence(format!("row {key} has corrupt data: {e}")))?;
        Ok(VirtualNode {
            data,
            is_directory: self.is_directory,
            mtime: self.mtime,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    rows: BTreeMap<String, StoredRow>,
}

#[async_trait]
pub(crate) trait Persister: Send + Sync {
    fn kind(&self) -> PersistenceKind;

    fn location(&self) -> Option<String>;

    /// Check the storage is usable before committing to it.
    async fn check(&self) -> Result<()>;

    async fn load(&self) -> Result<BTreeMap<String, VirtualNode>>;

    async fn save(&self, nodes: &BTreeMap<String, VirtualNode>) -> Result<()>;
}

fn io_err(path: &Path, err: io::Error) -> Error {
    Error::persistence(format!("{}: {}", path.display(), err))
}

async fn check_writable(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))?;
    let marker = dir.join(CHECK_FILE);
    tokio::fs::write(&marker, b"ok")
        .await
        .map_err(|e| io_err(&marker, e))?;
    tokio::fs::remove_file(&marker)
        .await
        .map_err(|e| io_err(&marker, e))
}

/// All rows in one JSON document, replaced atomically on save.
pub(crate) struct JsonFilePersister {
    file: PathBuf,
}

impl JsonFilePersister {
    pub fn new(dir: &Path) -> Self {
        Self {
            file: dir.join(DOCUMENT_FILE),
        }
    }
}

#[async_trait]
impl Persister for JsonFilePersister {
    fn kind(&self) -> PersistenceKind {
        PersistenceKind::JsonFile
    }

    fn location(&self) -> Option<String> {
        Some(self.file.display().to_string())
    }

    async fn check(&self) -> Result<()> {
        let dir = self.file.parent().unwrap_or(Path::new("."));
        check_writable(dir).await
    }

    async fn load(&self) -> Result<BTreeMap<String, VirtualNode>> {
        let bytes = match tokio::fs::read(&self.file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_err(&self.file, e)),
        };
        let doc: Document = serde_json::from_slice(&bytes)
            .map_err(|e| Error::persistence(format!("{}: {}", self.file.display(), e)))?;
        if doc.version > DOCUMENT_VERSION {
            let found = doc.version;
            log_warn!("filesystem document version {found} is newer than supported", found: found);
        }
        doc.rows
            .into_iter()
            .map(|(key, row)| {
                let node = row.into_node(&key)?;
                Ok((key, node))
            })
            .collect()
    }

    async fn save(&self, nodes: &BTreeMap<String, VirtualNode>) -> Result<()> {
        let doc = Document {
            version: DOCUMENT_VERSION,
            rows: nodes
                .iter()
                .map(|(key, node)| (key.clone(), StoredRow::from_node(key, node)))
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| Error::persistence(e.to_string()))?;
        let tmp = self.file.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.file)
            .await
            .map_err(|e| io_err(&self.file, e))
    }
}

/// One file per row under `rows/`, named by the hex-encoded path.
pub(crate) struct KeyFilesPersister {
    dir: PathBuf,
}

impl KeyFilesPersister {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.join(ROWS_DIR),
        }
    }

    fn row_file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hex::encode(key)))
    }
}

#[async_trait]
impl Persister for KeyFilesPersister {
    fn kind(&self) -> PersistenceKind {
        PersistenceKind::KeyFiles
    }

    fn location(&self) -> Option<String> {
        Some(self.dir.display().to_string())
    }

    async fn check(&self) -> Result<()> {
        check_writable(&self.dir).await
    }

    async fn load(&self) -> Result<BTreeMap<String, VirtualNode>> {
        let mut nodes = BTreeMap::new();
        let mut reader = match tokio::fs::read_dir(&self.dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(nodes),
            Err(e) => return Err(io_err(&self.dir, e)),
        };
        while let Some(item) = reader.next_entry().await.map_err(|e| io_err(&self.dir, e))? {
            let file_name = item.file_name().to_string_lossy().into_owned();
            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };
            let Some(key) = hex::decode(stem).ok().and_then(|b| String::from_utf8(b).ok()) else {
                log_debug!("skipping foreign file {name}", name: file_name);
                continue;
            };
            let bytes = tokio::fs::read(item.path())
                .await
                .map_err(|e| io_err(&item.path(), e))?;
            let row: StoredRow = serde_json::from_slice(&bytes)
                .map_err(|e| Error::persistence(format!("row {key}: {e}")))?;
            let node = row.into_node(&key)?;
            let _ = nodes.insert(key, node);
        }
        Ok(nodes)
    }

    async fn save(&self, nodes: &BTreeMap<String, VirtualNode>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err(&self.dir, e))?;
        for (key, node) in nodes {
            let file = self.row_file(key);
            let bytes = serde_json::to_vec(&StoredRow::from_node(key, node))
                .map_err(|e| Error::persistence(e.to_string()))?;
            tokio::fs::write(&file, bytes)
                .await
                .map_err(|e| io_err(&file, e))?;
        }

        // Drop rows that no longer exist.
        let mut reader = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_err(&self.dir, e))?;
        while let Some(item) = reader.next_entry().await.map_err(|e| io_err(&self.dir, e))? {
            let file_name = item.file_name().to_string_lossy().into_owned();
            let stale = file_name
                .strip_suffix(".json")
                .and_then(|stem| hex::decode(stem).ok())
                .and_then(|b| String::from_utf8(b).ok())
                .is_some_and(|key| !nodes.contains_key(&key));
            if stale {
                let path = item.path();
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| io_err(&path, e))?;
            }
        }
        Ok(())
    }
}

/// Keeps the last saved rows for the life of the process.
#[derive(Default)]
pub(crate) struct MemoryPersister {
    saved: tokio::sync::Mutex<BTreeMap<String, VirtualNode>>,
}

#[async_trait]
impl Persister for MemoryPersister {
    fn kind(&self) -> PersistenceKind {
        PersistenceKind::Memory
    }

    fn location(&self) -> Option<String> {
        None
    }

    async fn check(&self) -> Result<()> {
        Ok(())
    }

    async fn load(&self) -> Result<BTreeMap<String, VirtualNode>> {
        Ok(self.saved.lock().await.clone())
    }

    async fn save(&self, nodes: &BTreeMap<String, VirtualNode>) -> Result<()> {
        *self.saved.lock().await = nodes.clone();
        Ok(())
    }
}

fn fallback_chain(preferred: Option<PersistenceKind>) -> &'static [PersistenceKind] {
    match preferred {
        None | Some(PersistenceKind::JsonFile) => &[
            PersistenceKind::JsonFile,
            PersistenceKind::KeyFiles,
            PersistenceKind::Memory,
        ],
        Some(PersistenceKind::KeyFiles) => &[PersistenceKind::KeyFiles, PersistenceKind::Memory],
        Some(PersistenceKind::Memory) => &[PersistenceKind::Memory],
    }
}

/// Pick the first usable persister, starting from the configured one.
pub(crate) async fn select_persister(config: &FsConfig) -> Box<dyn Persister> {
    for kind in fallback_chain(config.persistence) {
        let candidate: Box<dyn Persister> = match (kind, &config.store_path) {
            (PersistenceKind::Memory, _) => Box::new(MemoryPersister::default()),
            (_, None) => {
                log_debug!("no store path configured, skipping {kind}", kind: kind.to_string());
                continue;
            }
            (PersistenceKind::JsonFile, Some(dir)) => Box::new(JsonFilePersister::new(dir)),
            (PersistenceKind::KeyFiles, Some(dir)) => Box::new(KeyFilesPersister::new(dir)),
        };
        match candidate.check().await {
            Ok(()) => {
                let kind = kind.to_string();
                let location = candidate.location().unwrap_or_default();
                log_info!("persisted filesystem using {kind} {location}", kind: kind, location: location);
                return candidate;
            }
            Err(e) => {
                let kind = kind.to_string();
                let error = e.to_string();
                log_warn!("{kind} persistence unavailable, falling back: {error}", kind: kind, error: error);
            }
        }
    }
    Box::new(MemoryPersister::default())
}
