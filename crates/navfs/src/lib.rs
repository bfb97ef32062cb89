// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem access for naveditor.
//!
//! One [`FilesystemDriver`] contract over several backends (host disk,
//! memory, a persisted key-value store, a sandboxed desktop host) and one
//! [`WatcherService`] contract for change notification. An [`FsContext`]
//! carries the state those share; [`create_filesystem_driver`] and
//! [`create_watcher_service`] pick the right pair for the runtime.

pub mod config;
pub mod context;
pub mod driver;
pub mod drivers;
pub mod entry;
pub mod error;
pub mod path;
pub mod platform;
pub mod subscription;
pub mod watcher;

pub use config::{FsConfig, PersistenceKind, RuntimePlatform};
pub use context::{EventBus, FsContext};
pub use driver::{BackendInfo, FilesystemDriver};
pub use drivers::{
    HostDirSandbox, HostEntry, MemoryDriver, NativeDriver, PersistedDriver, PersistedStorage,
    SandboxHost, SandboxedDriver, UnavailableDriver,
};
pub use entry::{FileEntry, WatchEvent, WatchEventType};
pub use error::{Error, ErrorKind, Result};
pub use path::{AbsolutePath, DirectoryPath, FilePath, RelativePath};
pub use platform::{
    RuntimeEnv, create_filesystem_driver, create_watcher_service, get_filesystem_backend_info,
};
pub use subscription::Subscription;
pub use watcher::{
    BusWatcher, NativeWatcher, NoopWatcher, PollingWatcher, WatchCallback, WatcherService,
};
