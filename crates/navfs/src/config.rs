// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem configuration.
//!
//! Values come from `NAVEDITOR_*` environment variables unless set
//! explicitly; explicit values always win.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const PLATFORM_ENV: &str = "NAVEDITOR_PLATFORM";
pub const ROOT_ENV: &str = "NAVEDITOR_ROOT";
pub const STORE_ENV: &str = "NAVEDITOR_STORE";
pub const PERSISTENCE_ENV: &str = "NAVEDITOR_PERSISTENCE";
pub const POLL_ENV: &str = "NAVEDITOR_POLL_MS";
pub const SEED_ENV: &str = "NAVEDITOR_SEED";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Where the process is running, which decides the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimePlatform {
    /// Direct host filesystem access.
    Native,
    /// Sandboxed desktop shell; file access goes through host commands.
    Desktop,
    /// No host filesystem; data lives in a persisted key-value store.
    Browser,
    /// Like `Browser`, without change notification.
    Worker,
}

impl std::fmt::Display for RuntimePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuntimePlatform::Native => "native",
            RuntimePlatform::Desktop => "desktop",
            RuntimePlatform::Browser => "browser",
            RuntimePlatform::Worker => "worker",
        };
        f.write_str(s)
    }
}

impl FromStr for RuntimePlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "node" => Ok(RuntimePlatform::Native),
            "desktop" | "tauri" => Ok(RuntimePlatform::Desktop),
            "browser" => Ok(RuntimePlatform::Browser),
            "worker" => Ok(RuntimePlatform::Worker),
            other => Err(Error::invalid_config(format!("unknown platform '{other}'"))),
        }
    }
}

/// Storage used by the persisted driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceKind {
    /// One JSON document holding every row.
    JsonFile,
    /// One file per row, keyed by the hex-encoded path.
    KeyFiles,
    /// Nothing survives the process.
    Memory,
}

impl std::fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PersistenceKind::JsonFile => "json-file",
            PersistenceKind::KeyFiles => "key-files",
            PersistenceKind::Memory => "memory",
        };
        f.write_str(s)
    }
}

impl FromStr for PersistenceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json-file" | "json" => Ok(PersistenceKind::JsonFile),
            "key-files" | "keys" => Ok(PersistenceKind::KeyFiles),
            "memory" => Ok(PersistenceKind::Memory),
            other => Err(Error::invalid_config(format!("unknown persistence '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsConfig {
    pub platform: Option<RuntimePlatform>,
    /// Base directory for the sandboxed driver.
    pub root: Option<PathBuf>,
    /// Location of the persisted driver's storage.
    pub store_path: Option<PathBuf>,
    /// Forces a persister instead of capability detection.
    pub persistence: Option<PersistenceKind>,
    pub poll_interval: Duration,
    /// Fill empty persisted storage with a small demo tree.
    pub seed_demo_content: bool,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            platform: None,
            root: None,
            store_path: None,
            persistence: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            seed_demo_content: true,
        }
    }
}

impl FsConfig {
    /// Read configuration from the environment.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(PLATFORM_ENV) {
            match raw.parse() {
                Ok(p) => config.platform = Some(p),
                Err(e) => {
                    let message = e.to_string();
                    diagnostics::log_warn!("ignoring {var}: {message}", var: PLATFORM_ENV, message: message);
                }
            }
        }
        if let Some(raw) = lookup(ROOT_ENV).filter(|s| !s.is_empty()) {
            config.root = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup(STORE_ENV).filter(|s| !s.is_empty()) {
            config.store_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup(PERSISTENCE_ENV) {
            match raw.parse() {
                Ok(p) => config.persistence = Some(p),
                Err(e) => {
                    let message = e.to_string();
                    diagnostics::log_warn!("ignoring {var}: {message}", var: PERSISTENCE_ENV, message: message);
                }
            }
        }
        if let Some(raw) = lookup(POLL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => {
                    diagnostics::log_warn!("ignoring {var}={raw}", var: POLL_ENV, raw: raw);
                }
            }
        }
        if let Some(raw) = lookup(SEED_ENV) {
            config.seed_demo_content = !matches!(raw.trim(), "0" | "false" | "no");
        }

        config
    }

    #[must_use]
    pub fn with_platform(mut self, platform: RuntimePlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_store_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_persistence(mut self, kind: PersistenceKind) -> Self {
        self.persistence = Some(kind);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed_demo_content = seed;
        self
    }
}
