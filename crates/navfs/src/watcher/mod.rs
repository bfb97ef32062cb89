// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Change notification.
//!
//! Every service hands back a [`Subscription`]; events stop as soon as it
//! is unsubscribed or dropped.

mod bus;
mod native;
mod noop;
mod polling;

pub use bus::BusWatcher;
pub use native::NativeWatcher;
pub use noop::NoopWatcher;
pub use polling::PollingWatcher;

use crate::entry::WatchEvent;
use crate::error::Result;
use crate::path::{DirectoryPath, FilePath};
use crate::subscription::Subscription;

pub type WatchCallback = Box<dyn Fn(&WatchEvent) + Send + Sync + 'static>;

pub trait WatcherService: Send + Sync {
    /// Report changes to a directory and its immediate contents.
    fn watch(&self, path: &DirectoryPath, callback: WatchCallback) -> Result<Subscription>;

    /// Report changes to one file.
    fn watch_file(&self, path: &FilePath, callback: WatchCallback) -> Result<Subscription>;
}
