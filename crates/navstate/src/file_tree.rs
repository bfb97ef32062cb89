// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Keeping the `entries` table in step with a driver.

use crate::accessors::entries::{forget_subtree, mirror_directory};
use crate::error::{Result, StateError};
use crate::store::Store;
use diagnostics::{log_debug, log_warn};
use navfs::{DirectoryPath, FilesystemDriver, Subscription, WatchEvent, WatcherService};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Re-list `dir` and mirror it into the store.
///
/// A directory that no longer exists is dropped from the cache along with
/// everything below it, and counts as zero entries.
pub async fn refresh_directory(
    driver: &dyn FilesystemDriver,
    store: &mut Store,
    dir: &DirectoryPath,
) -> Result<usize> {
    match driver.readdir(dir).await {
        Ok(entries) => mirror_directory(store, dir.as_str(), &entries),
        Err(e) if e.is_not_found() => {
            forget_subtree(store, dir.as_str());
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Refresh `dir` into `store` now and again on every change the watcher
/// reports. Refreshes run on the current tokio runtime; dropping the
/// returned subscription stops them.
pub async fn watch_directory(
    watcher: &dyn WatcherService,
    driver: Arc<dyn FilesystemDriver>,
    store: Arc<Mutex<Store>>,
    dir: DirectoryPath,
) -> Result<Subscription> {
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|_| StateError::invalid_input("watching a directory needs a tokio runtime"))?;

    let _ = refresh_directory(driver.as_ref(), &mut *store.lock().await, &dir).await?;

    let target = dir.clone();
    let subscription = watcher.watch(
        &dir,
        Box::new(move |event: &WatchEvent| {
            let driver = driver.clone();
            let store = store.clone();
            let dir = target.clone();
            let changed = event.path.to_string();
            let _ = handle.spawn(async move {
                let mut store = store.lock().await;
                match refresh_directory(driver.as_ref(), &mut store, &dir).await {
                    Ok(count) => {
                        log_debug!("refreshed {count} entries after change to {changed}", count: count, changed: changed);
                    }
                    Err(e) => {
                        let dir = dir.to_string();
                        let err = e.to_string();
                        log_warn!("refresh of {dir} failed: {error}", dir: dir, error: err);
                    }
                }
            });
        }),
    )?;
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::entries::{get_entry, list_children};
    use crate::tables::create_store;
    use navfs::{BusWatcher, EventBus, FilePath, MemoryDriver, WatchEventType};
    use std::time::Duration;

    fn dir(path: &str) -> DirectoryPath {
        DirectoryPath::new(path).unwrap()
    }

    fn file(path: &str) -> FilePath {
        FilePath::new(path).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_mirrors_listing() {
        let driver = MemoryDriver::with_seed([("/docs/a.md", "aa"), ("/docs/sub/", "")]).unwrap();
        let mut store = create_store();

        let count = refresh_directory(&driver, &mut store, &dir("/docs")).await.unwrap();
        assert_eq!(count, 2);
        let a = get_entry(&store, "/docs/a.md").unwrap();
        assert_eq!(a.size, 2);
        assert_eq!(a.parent_path, "/docs");
        assert!(get_entry(&store, "/docs/sub").unwrap().is_directory);

        driver.rm(&file("/docs/a.md")).await.unwrap();
        let _ = refresh_directory(&driver, &mut store, &dir("/docs")).await.unwrap();
        assert_eq!(list_children(&store, "/docs").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_is_forgotten() {
        let driver = MemoryDriver::with_seed([("/gone/x.txt", "x")]).unwrap();
        let mut store = create_store();
        let _ = refresh_directory(&driver, &mut store, &dir("/gone")).await.unwrap();
        assert!(get_entry(&store, "/gone/x.txt").is_some());

        driver.rm(&file("/gone")).await.unwrap();
        let count = refresh_directory(&driver, &mut store, &dir("/gone")).await.unwrap();
        assert_eq!(count, 0);
        assert!(get_entry(&store, "/gone/x.txt").is_none());
    }

    #[tokio::test]
    async fn test_refresh_of_a_file_fails() {
        let driver = MemoryDriver::with_seed([("/f.txt", "x")]).unwrap();
        let mut store = create_store();
        assert!(refresh_directory(&driver, &mut store, &dir("/f.txt")).await.is_err());
    }

    #[tokio::test]
    async fn test_watch_refreshes_on_events() {
        let driver: Arc<dyn FilesystemDriver> = Arc::new(MemoryDriver::new());
        driver.mkdir(&dir("/w")).await.unwrap();
        let bus = EventBus::new();
        let watcher = BusWatcher::new(bus.clone());
        let store = Arc::new(Mutex::new(create_store()));

        let subscription = watch_directory(&watcher, driver.clone(), store.clone(), dir("/w"))
            .await
            .unwrap();
        assert!(list_children(&*store.lock().await, "/w").is_empty());

        driver.write_file(&file("/w/new.txt"), b"hi").await.unwrap();
        bus.publish(&WatchEvent::new(WatchEventType::Created, file("/w/new.txt")));

        let mut seen = false;
        for _ in 0..50 {
            if get_entry(&*store.lock().await, "/w/new.txt").is_some() {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen);

        subscription.unsubscribe();
        assert_eq!(bus.listener_count(), 0);
    }
}
