// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{WatchCallback, WatcherService};
use crate::context::EventBus;
use crate::entry::WatchEvent;
use crate::error::Result;
use crate::path::{DirectoryPath, FilePath, normalize_virtual};
use crate::subscription::Subscription;

fn is_same_path(left: &str, right: &str) -> bool {
    normalize_virtual(left) == normalize_virtual(right)
}

fn is_within_directory(target: &str, directory: &str) -> bool {
    let target = normalize_virtual(target);
    let directory = normalize_virtual(directory);
    directory == "/" || target == directory || target.starts_with(&format!("{directory}/"))
}

/// Watches the events drivers publish on a context's bus.
///
/// Used where there is no OS notification: the persisted store and the
/// sandboxed desktop driver announce their own mutations.
#[derive(Clone)]
pub struct BusWatcher {
    bus: EventBus,
}

impl BusWatcher {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl WatcherService for BusWatcher {
    fn watch(&self, path: &DirectoryPath, callback: WatchCallback) -> Result<Subscription> {
        let dir = path.as_str().to_string();
        Ok(self.bus.subscribe(move |event: &WatchEvent| {
            let inside = is_within_directory(event.path.as_str(), &dir)
                || event
                    .old_path
                    .as_ref()
                    .is_some_and(|old| is_within_directory(old.as_str(), &dir));
            if inside {
                callback(event);
            }
        }))
    }

    fn watch_file(&self, path: &FilePath, callback: WatchCallback) -> Result<Subscription> {
        let file = path.as_str().to_string();
        Ok(self.bus.subscribe(move |event: &WatchEvent| {
            let same = is_same_path(event.path.as_str(), &file)
                || event
                    .old_path
                    .as_ref()
                    .is_some_and(|old| is_same_path(old.as_str(), &file));
            if same {
                callback(event);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::WatchEventType;
    use std::sync::{Arc, Mutex};

    fn modified(path: &str) -> WatchEvent {
        WatchEvent::new(WatchEventType::Modified, FilePath::new(path).unwrap())
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, WatchCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |e: &WatchEvent| sink.lock().unwrap().push(e.path.to_string())))
    }

    #[test]
    fn test_directory_filter() {
        let bus = EventBus::new();
        let watcher = BusWatcher::new(bus.clone());
        let (seen, callback) = recorder();
        let _sub = watcher.watch(&DirectoryPath::new("/src/").unwrap(), callback).unwrap();
        bus.publish(&modified("/src/a.ts"));
        bus.publish(&modified("/srcx/b.ts"));
        bus.publish(&modified("/src"));
        bus.publish(&modified("/other"));
        assert_eq!(*seen.lock().unwrap(), vec!["/src/a.ts", "/src"]);
    }

    #[test]
    fn test_root_sees_everything() {
        let bus = EventBus::new();
        let (seen, callback) = recorder();
        let _sub = BusWatcher::new(bus.clone()).watch(&DirectoryPath::root(), callback).unwrap();
        bus.publish(&modified("/a/b/c"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_file_filter_matches_old_path() {
        let bus = EventBus::new();
        let (seen, callback) = recorder();
        let sub = BusWatcher::new(bus.clone())
            .watch_file(&FilePath::new("/notes.txt").unwrap(), callback)
            .unwrap();
        bus.publish(&modified("notes.txt"));
        bus.publish(&WatchEvent::moved(
            FilePath::new("/notes.txt").unwrap(),
            FilePath::new("/archive/notes.txt").unwrap(),
        ));
        bus.publish(&modified("/notes.md"));
        sub.unsubscribe();
        bus.publish(&modified("/notes.txt"));
        assert_eq!(*seen.lock().unwrap(), vec!["notes.txt", "/archive/notes.txt"]);
    }
}
