//! Concurrent event store for the profiler.
//!
//! The ordered batch lives behind a lock and is replaced wholesale on
//! `clear`; there is no partial eviction. A `DashMap` keeps an id index
//! for point lookups, and every recorded event is fanned out on a
//! broadcast channel for live dashboard subscribers. View toggles are
//! store state handed around explicitly, never globals.

use crate::model::{ServerEvent, ServerEvents};
use dashmap::DashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Recorder and snapshot source for the request profiler.
pub struct ProfilerStore {
    batch: RwLock<ServerEvents>,
    index: DashMap<String, ServerEvent>,
    live: broadcast::Sender<ServerEvent>,
}

impl Default for ProfilerStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ProfilerStore {
    /// Create a store whose live channel buffers `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (live, _) = broadcast::channel(capacity);
        Self {
            batch: RwLock::new(ServerEvents::default()),
            index: DashMap::new(),
            live,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ServerEvents> {
        self.batch.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ServerEvents> {
        self.batch.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an event, routing on its parentage.
    pub fn record(&self, event: ServerEvent) {
        if event.is_main() {
            self.record_main(event);
        } else {
            self.record_sub(event);
        }
    }

    /// Record a main request. Without `preserve_log`, a new navigation
    /// replaces the previous batch, except sub-requests of the arriving
    /// navigation itself: the push channel routinely delivers those before
    /// their main's response finishes.
    pub fn record_main(&self, event: ServerEvent) {
        {
            let mut batch = self.write();
            if !batch.preserve_log && !batch.is_empty() {
                debug!("New navigation, clearing previous batch");
                batch.main_requests.clear();
                batch.sub_requests.retain(|sub| sub.request_id == event.id);
                self.index.clear();
                for sub in &batch.sub_requests {
                    self.index.insert(sub.id.clone(), sub.clone());
                }
            }
            batch.main_requests.push(event.clone());
        }
        self.index.insert(event.id.clone(), event.clone());
        let _ = self.live.send(event);
    }

    /// Record a sub-request. Orphans (no parent in the batch yet) are kept
    /// raw; the aggregator excludes them from grouped output until their
    /// parent arrives.
    pub fn record_sub(&self, event: ServerEvent) {
        self.write().sub_requests.push(event.clone());
        self.index.insert(event.id.clone(), event.clone());
        let _ = self.live.send(event);
    }

    /// Drop all recorded events. Toggles survive.
    pub fn clear(&self) {
        let mut batch = self.write();
        batch.main_requests.clear();
        batch.sub_requests.clear();
        self.index.clear();
    }

    pub fn set_hide_put_requests(&self, hide: bool) {
        self.write().hide_put_requests = hide;
    }

    pub fn set_preserve_log(&self, preserve: bool) {
        self.write().preserve_log = preserve;
    }

    pub fn set_hide_notification(&self, hide: bool) {
        self.write().hide_notification = hide;
    }

    /// Current batch and toggles, cloned out.
    pub fn snapshot(&self) -> ServerEvents {
        self.read().clone()
    }

    /// Point lookup by event id.
    pub fn event(&self, id: &str) -> Option<ServerEvent> {
        self.index.get(id).map(|entry| entry.value().clone())
    }

    /// Subscribe to events as they are recorded.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.live.subscribe()
    }
}
