// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{WatchCallback, WatcherService};
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::driver::FilesystemDriver;
use crate::entry::{WatchEvent, WatchEventType};
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath};
use crate::subscription::Subscription;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

enum Target {
    Directory(DirectoryPath),
    File(FilePath),
}

/// Periodic probing through a driver, for hosts without change notification.
///
/// Semantics are approximate: each tick reports `Modified` when the target
/// is readable and `Deleted` when it is not, whether or not anything
/// actually changed. The first comparison happens one interval after `watch`.
pub struct PollingWatcher {
    driver: Arc<dyn FilesystemDriver>,
    interval: Duration,
}

impl PollingWatcher {
    #[must_use]
    pub fn new(driver: Arc<dyn FilesystemDriver>) -> Self {
        Self::with_interval(driver, DEFAULT_POLL_INTERVAL)
    }

    #[must_use]
    pub fn with_interval(driver: Arc<dyn FilesystemDriver>, interval: Duration) -> Self {
        Self { driver, interval }
    }

    fn spawn(&self, target: Target, callback: WatchCallback) -> Result<Subscription> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::unavailable("polling watcher needs a tokio runtime"))?;

        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let driver = self.driver.clone();
        let period = self.interval;

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let _ = ticker.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                let (ok, path) = match &target {
                    Target::Directory(dir) => (driver.readdir(dir).await.is_ok(), dir.as_file_path()),
                    Target::File(file) => (driver.stat(file).await.is_ok(), file.clone()),
                };
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                let kind = if ok {
                    WatchEventType::Modified
                } else {
                    WatchEventType::Deleted
                };
                callback(&WatchEvent::new(kind, path));
            }
        });

        Ok(Subscription::new(active, move || task.abort()))
    }
}

impl WatcherService for PollingWatcher {
    fn watch(&self, path: &DirectoryPath, callback: WatchCallback) -> Result<Subscription> {
        self.spawn(Target::Directory(path.clone()), callback)
    }

    fn watch_file(&self, path: &FilePath, callback: WatchCallback) -> Result<Subscription> {
        self.spawn(Target::File(path.clone()), callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::MemoryDriver;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<WatchEventType>>>, WatchCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |e: &WatchEvent| sink.lock().unwrap().push(e.kind)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_modified_then_deleted() {
        let driver = Arc::new(MemoryDriver::new());
        let file = FilePath::new("/watched.txt").unwrap();
        driver.write_file(&file, b"x").await.unwrap();
        let watcher = PollingWatcher::with_interval(driver.clone(), Duration::from_millis(100));
        let (seen, callback) = recorder();
        let sub = watcher.watch_file(&file, callback).unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        driver.rm(&file).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        sub.unsubscribe();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![WatchEventType::Modified, WatchEventType::Deleted]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_ticks() {
        let driver = Arc::new(MemoryDriver::new());
        let watcher = PollingWatcher::with_interval(driver, Duration::from_millis(100));
        let (seen, callback) = recorder();
        let sub = watcher.watch(&DirectoryPath::root(), callback).unwrap();
        sub.unsubscribe();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_requires_runtime() {
        let watcher = PollingWatcher::new(Arc::new(MemoryDriver::new()));
        let err = watcher.watch(&DirectoryPath::root(), Box::new(|_: &WatchEvent| {})).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unavailable);
    }
}
