// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result, anyhow};
use navfs::path::normalize_virtual;
use navfs::{
    DirectoryPath, FileEntry, FilePath, FilesystemDriver, FsContext, NativeDriver,
    RuntimePlatform, WatcherService, create_filesystem_driver, create_watcher_service,
};
use navstate::{SchemaStatus, Store, load_store, save_store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STATE_ENV: &str = "NAVEDITOR_STATE";
pub const DEFAULT_STATE_FILE: &str = ".naveditor/state.json";

/// Everything a command needs: the filesystem context, the directory
/// relative paths resolve against, and where the store is saved.
#[derive(Clone)]
pub struct NavContext {
    fs: FsContext,
    cwd: PathBuf,
    state_path: PathBuf,
}

impl NavContext {
    #[must_use]
    pub fn new(fs: FsContext, cwd: PathBuf, state_path: PathBuf) -> Self {
        let state_path = if state_path.is_absolute() {
            state_path
        } else {
            cwd.join(state_path)
        };
        Self {
            fs,
            cwd,
            state_path,
        }
    }

    /// Context for the process: environment configuration, the current
    /// directory, and the state file override if any.
    pub fn from_env(state_override: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let state = state_override.unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
        Ok(Self::new(FsContext::from_env(), cwd, state))
    }

    #[must_use]
    pub fn fs(&self) -> &FsContext {
        &self.fs
    }

    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    #[must_use]
    pub fn driver(&self) -> Arc<dyn FilesystemDriver> {
        create_filesystem_driver(&self.fs)
    }

    #[must_use]
    pub fn watcher(&self) -> Arc<dyn WatcherService> {
        create_watcher_service(&self.fs)
    }

    /// Map a user-supplied path into the driver's namespace.
    ///
    /// The native driver sees host paths, so relative input is joined to
    /// the working directory. Every other backend has its own rooted
    /// namespace where relative input starts at `/`.
    fn resolve(&self, input: &str) -> String {
        match self.fs.env().platform {
            RuntimePlatform::Native => {
                let path = Path::new(input);
                let full = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.cwd.join(path)
                };
                full.to_string_lossy().into_owned()
            }
            _ => normalize_virtual(&format!("/{}", input.trim_start_matches('/'))),
        }
    }

    pub fn file(&self, input: &str) -> Result<FilePath> {
        Ok(FilePath::new(self.resolve(input))?)
    }

    pub fn dir(&self, input: &str) -> Result<DirectoryPath> {
        Ok(DirectoryPath::new(self.resolve(input))?)
    }

    fn state_file(&self) -> Result<FilePath> {
        let path = self.state_path.to_string_lossy();
        FilePath::new(path.as_ref()).map_err(|e| anyhow!("bad state path {path}: {e}"))
    }

    /// The saved store, or a fresh one.
    pub async fn open_store(&self) -> Result<Store> {
        let (store, status) = load_store(&NativeDriver::new(), &self.state_file()?)
            .await
            .with_context(|| format!("cannot load state from {}", self.state_path.display()))?;
        if let SchemaStatus::Newer(version) = status {
            diagnostics::log_warn!(
                "state file was written by a newer naveditor (schema {version})",
                version: version
            );
        }
        Ok(store)
    }

    pub async fn save_store(&self, store: &Store) -> Result<()> {
        save_store(&NativeDriver::new(), &self.state_file()?, store)
            .await
            .with_context(|| format!("cannot save state to {}", self.state_path.display()))
    }
}

/// Human-readable byte count.
#[must_use]
pub fn format_file_size(size: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let size_f = size as f64;
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size_f / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size_f / 1024.0)
    } else {
        format!("{size}B")
    }
}

/// One line of `ls` output.
#[must_use]
pub fn format_entry(entry: &FileEntry) -> String {
    let mtime = entry
        .mtime
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    if entry.is_directory {
        format!("d {:>8} {mtime} {}/", "-", entry.name)
    } else {
        let size = format_file_size(entry.size.unwrap_or(0));
        format!("- {size:>8} {mtime} {}", entry.name)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use navfs::FsConfig;
    use tempfile::TempDir;

    /// A native context rooted in a fresh temporary directory.
    pub fn native_context() -> (TempDir, NavContext) {
        let tmp = TempDir::new().unwrap();
        let fs = FsContext::new(FsConfig::default().with_platform(RuntimePlatform::Native));
        let ctx = NavContext::new(fs, tmp.path().to_path_buf(), PathBuf::from(DEFAULT_STATE_FILE));
        (tmp, ctx)
    }
}
