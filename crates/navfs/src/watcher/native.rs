// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{WatchCallback, WatcherService};
use crate::entry::{WatchEvent, WatchEventType};
use crate::error::{Error, Result};
use crate::path::{DirectoryPath, FilePath};
use crate::subscription::Subscription;
use diagnostics::{log_debug, log_warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// OS change notification through `notify`, non-recursive.
///
/// The OS event kind is not trusted; every notification is reported as
/// `Modified` for the affected path.
#[derive(Debug, Default, Clone)]
pub struct NativeWatcher;

impl NativeWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn watch_path(&self, target: &str, callback: WatchCallback) -> Result<Subscription> {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let fallback = target.to_string();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if !flag.load(Ordering::SeqCst) {
                return;
            }
            match res {
                Ok(event) => {
                    let paths: Vec<String> = if event.paths.is_empty() {
                        vec![fallback.clone()]
                    } else {
                        event
                            .paths
                            .iter()
                            .map(|p| p.to_string_lossy().into_owned())
                            .collect()
                    };
                    for path in paths {
                        if !flag.load(Ordering::SeqCst) {
                            return;
                        }
                        callback(&WatchEvent::new(
                            WatchEventType::Modified,
                            FilePath::new_unchecked(path),
                        ));
                    }
                }
                Err(e) => {
                    let error = e.to_string();
                    log_warn!("native watch error: {error}", error: error);
                }
            }
        })
        .map_err(|e| watch_error(target, e))?;

        watcher
            .watch(Path::new(target), RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(target, e))?;
        log_debug!("watching {target}", target: target);

        Ok(Subscription::new(active, move || drop::<RecommendedWatcher>(watcher)))
    }
}

fn watch_error(path: &str, err: notify::Error) -> Error {
    match &err.kind {
        notify::ErrorKind::PathNotFound => Error::not_found(path),
        notify::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            Error::not_found(path)
        }
        _ => Error::Watch {
            path: path.to_string(),
            source: err,
        },
    }
}

impl WatcherService for NativeWatcher {
    fn watch(&self, path: &DirectoryPath, callback: WatchCallback) -> Result<Subscription> {
        self.watch_path(path.as_str(), callback)
    }

    fn watch_file(&self, path: &FilePath, callback: WatchCallback) -> Result<Subscription> {
        self.watch_path(path.as_str(), callback)
    }
}
