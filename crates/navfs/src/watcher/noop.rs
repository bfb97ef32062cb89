// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{WatchCallback, WatcherService};
use crate::error::Result;
use crate::path::{DirectoryPath, FilePath};
use crate::subscription::Subscription;

/// For runtimes with no way to observe changes. Never calls back.
#[derive(Debug, Default, Clone)]
pub struct NoopWatcher;

impl WatcherService for NoopWatcher {
    fn watch(&self, _path: &DirectoryPath, _callback: WatchCallback) -> Result<Subscription> {
        Ok(Subscription::noop())
    }

    fn watch_file(&self, _path: &FilePath, _callback: WatchCallback) -> Result<Subscription> {
        Ok(Subscription::noop())
    }
}
