// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Explicit runtime context for the filesystem layer.
//!
//! An [`FsContext`] owns everything that must be shared between drivers
//! and watchers created for the same runtime: the change-event bus, the
//! lazily opened persisted storage, and the memoized factory results.
//! Contexts are cheap to clone; clones share state.

use crate::config::FsConfig;
use crate::driver::FilesystemDriver;
use crate::drivers::persisted::PersistedStorage;
use crate::entry::WatchEvent;
use crate::error::Result;
use crate::platform::RuntimeEnv;
use crate::subscription::Subscription;
use crate::watcher::WatcherService;
use diagnostics::{log_debug, log_error};
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::OnceCell;

type Listener = Arc<dyn Fn(&WatchEvent) + Send + Sync>;

struct BusInner {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, (Arc<AtomicBool>, Listener)>>,
}

/// Synchronous fan-out of change events to subscribers.
///
/// A listener that panics is logged and skipped; the other listeners
/// still receive the event.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&WatchEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        let _ = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, (active.clone(), Arc::new(listener)));

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(active, move || {
            if let Some(inner) = weak.upgrade() {
                let _ = inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        })
    }

    pub fn publish(&self, event: &WatchEvent) {
        // Listeners may subscribe or unsubscribe while being called.
        let snapshot: Vec<(Arc<AtomicBool>, Listener)> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for (active, listener) in snapshot {
            if !active.load(Ordering::SeqCst) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                let path = event.path.as_str();
                log_error!("watch listener panicked for {path}", path: path);
            }
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every listener without running their subscriptions' cleanup.
    pub fn clear(&self) {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (active, _) in listeners.values() {
            active.store(false, Ordering::SeqCst);
        }
        listeners.clear();
    }
}

/// State reachable from drivers and watchers.
///
/// Kept apart from the factory memo so a memoized driver holding this
/// does not keep itself alive.
pub struct ContextShared {
    pub(crate) config: FsConfig,
    pub(crate) env: RuntimeEnv,
    pub(crate) bus: EventBus,
    persisted: OnceCell<Arc<PersistedStorage>>,
}

impl ContextShared {
    /// Open the persisted storage on first use.
    pub(crate) async fn persisted_storage(&self) -> Result<Arc<PersistedStorage>> {
        self.persisted
            .get_or_try_init(|| async {
                log_debug!("opening persisted filesystem storage");
                PersistedStorage::open(&self.config).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    pub(crate) fn persisted_storage_if_ready(&self) -> Option<Arc<PersistedStorage>> {
        self.persisted.get().cloned()
    }
}

#[derive(Default)]
pub(crate) struct FactoryMemo {
    pub driver: OnceLock<Arc<dyn FilesystemDriver>>,
    pub watcher: OnceLock<Arc<dyn WatcherService>>,
}

#[derive(Clone)]
pub struct FsContext {
    shared: Arc<ContextShared>,
    memo: Arc<FactoryMemo>,
}

impl FsContext {
    /// Context for the detected runtime.
    #[must_use]
    pub fn new(config: FsConfig) -> Self {
        let env = RuntimeEnv::detect(&config);
        Self::with_env(config, env)
    }

    /// Context for an explicit runtime description.
    #[must_use]
    pub fn with_env(config: FsConfig, env: RuntimeEnv) -> Self {
        Self {
            shared: Arc::new(ContextShared {
                config,
                env,
                bus: EventBus::new(),
                persisted: OnceCell::new(),
            }),
            memo: Arc::new(FactoryMemo::default()),
        }
    }

    /// Context configured from `NAVEDITOR_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FsConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &FsConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn env(&self) -> &RuntimeEnv {
        &self.shared.env
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub(crate) fn shared(&self) -> Arc<ContextShared> {
        self.shared.clone()
    }

    pub(crate) fn memo(&self) -> &FactoryMemo {
        &self.memo
    }

    /// The persisted storage, opening it if needed.
    pub async fn persisted_storage(&self) -> Result<Arc<PersistedStorage>> {
        self.shared.persisted_storage().await
    }

    /// Flush persisted storage and drop all bus listeners.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(storage) = self.shared.persisted_storage_if_ready() {
            storage.flush().await?;
        }
        self.shared.bus.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::WatchEventType;
    use crate::path::FilePath;
    use std::sync::atomic::AtomicUsize;

    fn event(path: &str) -> WatchEvent {
        WatchEvent::new(WatchEventType::Modified, FilePath::new(path).unwrap())
    }

    #[test]
    fn test_publish_reaches_active_listeners_only() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            let _ = c.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&event("/a"));
        sub.unsubscribe();
        bus.publish(&event("/a"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _bad = bus.subscribe(|_| panic!("listener failure"));
        let c = count.clone();
        let _good = bus.subscribe(move |_| {
            let _ = c.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&event("/x"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_unsubscribe_during_publish() {
        let bus = EventBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner = slot.clone();
        let sub = bus.subscribe(move |_| {
            if let Some(s) = inner.lock().unwrap().take() {
                s.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);
        bus.publish(&event("/y"));
        assert_eq!(bus.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_clears_listeners() {
        let ctx = FsContext::new(FsConfig::default());
        let sub = ctx.bus().subscribe(|_| {});
        ctx.shutdown().await.unwrap();
        assert_eq!(ctx.bus().listener_count(), 0);
        assert!(!sub.is_active());
    }
}
