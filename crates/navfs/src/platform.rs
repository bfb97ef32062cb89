// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Runtime detection and backend selection.
//!
//! | platform | driver | watcher |
//! |----------|--------|---------|
//! | native   | [`NativeDriver`] | [`NativeWatcher`], or [`PollingWatcher`] without OS notification |
//! | desktop  | [`SandboxedDriver`] over [`HostDirSandbox`] | [`BusWatcher`] |
//! | browser  | [`PersistedDriver`] | [`BusWatcher`] |
//! | worker   | [`PersistedDriver`] | [`NoopWatcher`] |

use crate::config::{FsConfig, RuntimePlatform};
use crate::context::FsContext;
use crate::driver::{BackendInfo, FilesystemDriver};
use crate::drivers::{HostDirSandbox, NativeDriver, PersistedDriver, SandboxedDriver};
use crate::watcher::{BusWatcher, NativeWatcher, NoopWatcher, PollingWatcher, WatcherService};
use diagnostics::log_info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub platform: RuntimePlatform,
    /// Whether the host can deliver OS change notifications.
    pub has_fs_watch: bool,
}

impl RuntimeEnv {
    #[must_use]
    pub fn new(platform: RuntimePlatform, has_fs_watch: bool) -> Self {
        Self {
            platform,
            has_fs_watch,
        }
    }

    /// The configured platform, or the one this binary was built for.
    #[must_use]
    pub fn detect(config: &FsConfig) -> Self {
        let platform = config.platform.unwrap_or(if cfg!(target_arch = "wasm32") {
            RuntimePlatform::Browser
        } else {
            RuntimePlatform::Native
        });
        let has_fs_watch = platform == RuntimePlatform::Native && !cfg!(target_arch = "wasm32");
        Self::new(platform, has_fs_watch)
    }
}

fn sandbox_root(config: &FsConfig) -> PathBuf {
    config
        .root
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The driver for this context's platform. Created once per context.
pub fn create_filesystem_driver(ctx: &FsContext) -> Arc<dyn FilesystemDriver> {
    ctx.memo()
        .driver
        .get_or_init(|| {
            let platform = ctx.env().platform;
            let driver: Arc<dyn FilesystemDriver> = match platform {
                RuntimePlatform::Native => Arc::new(NativeDriver::new()),
                RuntimePlatform::Desktop => Arc::new(
                    SandboxedDriver::new(HostDirSandbox::new(sandbox_root(ctx.config())))
                        .with_bus(ctx.bus().clone()),
                ),
                RuntimePlatform::Browser | RuntimePlatform::Worker => {
                    Arc::new(PersistedDriver::new(ctx))
                }
            };
            let adapter = driver.backend_info().adapter;
            let platform = platform.to_string();
            log_info!("filesystem driver {adapter} for {platform}", adapter: adapter, platform: platform);
            driver
        })
        .clone()
}

/// The watcher for this context's platform. Created once per context.
pub fn create_watcher_service(ctx: &FsContext) -> Arc<dyn WatcherService> {
    ctx.memo()
        .watcher
        .get_or_init(|| {
            let env = ctx.env();
            let watcher: Arc<dyn WatcherService> = match env.platform {
                RuntimePlatform::Native if env.has_fs_watch => Arc::new(NativeWatcher::new()),
                RuntimePlatform::Native => Arc::new(PollingWatcher::with_interval(
                    create_filesystem_driver(ctx),
                    ctx.config().poll_interval,
                )),
                RuntimePlatform::Desktop | RuntimePlatform::Browser => {
                    Arc::new(BusWatcher::new(ctx.bus().clone()))
                }
                RuntimePlatform::Worker => Arc::new(NoopWatcher),
            };
            watcher
        })
        .clone()
}

/// Describe the driver this context uses.
pub fn get_filesystem_backend_info(ctx: &FsContext) -> BackendInfo {
    create_filesystem_driver(ctx).backend_info()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(platform: RuntimePlatform) -> FsContext {
        FsContext::new(FsConfig::default().with_platform(platform))
    }

    #[test]
    fn test_detect_defaults_to_native() {
        let env = RuntimeEnv::detect(&FsConfig::default());
        assert_eq!(env.platform, RuntimePlatform::Native);
        assert!(env.has_fs_watch);
    }

    #[test]
    fn test_driver_selection() {
        assert_eq!(get_filesystem_backend_info(&ctx(RuntimePlatform::Native)).adapter, "native");
        assert_eq!(get_filesystem_backend_info(&ctx(RuntimePlatform::Desktop)).adapter, "sandboxed");
        assert_eq!(
            get_filesystem_backend_info(&ctx(RuntimePlatform::Browser)).adapter,
            "persisted-store"
        );
        assert_eq!(
            get_filesystem_backend_info(&ctx(RuntimePlatform::Worker)).platform,
            RuntimePlatform::Worker
        );
    }

    #[test]
    fn test_driver_is_memoized_per_context() {
        let a = ctx(RuntimePlatform::Browser);
        let first = create_filesystem_driver(&a);
        let second = create_filesystem_driver(&a.clone());
        assert!(Arc::ptr_eq(&first, &second));
        let other = create_filesystem_driver(&ctx(RuntimePlatform::Browser));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn test_browser_watcher_sees_driver_writes() {
        use crate::entry::WatchEvent;
        use crate::path::{DirectoryPath, FilePath};
        use std::sync::Mutex;

        let ctx = FsContext::new(
            FsConfig::default()
                .with_platform(RuntimePlatform::Browser)
                .with_seed(false),
        );
        let driver = create_filesystem_driver(&ctx);
        let watcher = create_watcher_service(&ctx);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = watcher
            .watch(
                &DirectoryPath::new("/src").unwrap(),
                Box::new(move |e: &WatchEvent| sink.lock().unwrap().push(e.path.to_string())),
            )
            .unwrap();
        driver.write_file(&FilePath::new("/src/main.ts").unwrap(), b"").await.unwrap();
        driver.write_file(&FilePath::new("/other.txt").unwrap(), b"").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["/src", "/src/main.ts"]);
    }

    #[tokio::test]
    async fn test_native_without_notification_polls() {
        let ctx = FsContext::with_env(
            FsConfig::default(),
            RuntimeEnv::new(RuntimePlatform::Native, false),
        );
        let watcher = create_watcher_service(&ctx);
        let sub = watcher
            .watch(&crate::path::DirectoryPath::root(), Box::new(|_: &crate::entry::WatchEvent| {}))
            .unwrap();
        assert!(sub.is_active());
    }
}
