//! Single-flight, TTL-aware fetching of remote JSON
//!
//! For any key at most one network fetch runs at a time. Callers arriving
//! while it runs are attached as waiters and receive exactly the outcome of
//! that fetch, success or failure.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use super::backend::{CacheBackend, StoreError};
use super::bootstrap;
use super::key::CacheKey;
use super::state::{Bootstrap, CacheEntry, CacheState, Lookup, Outcome};
use super::store::ManifestStore;
use crate::fetch::{FetchError, JsonFetcher};

/// State shared between a [`ResponseCache`] and the tasks it spawns
pub(super) struct Shared {
    state: Mutex<CacheState>,
    pub(super) store: ManifestStore,
    fetcher: Arc<dyn JsonFetcher>,
}

impl Shared {
    pub(super) fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the outcome of a fetch, persists it and wakes every waiter
    fn complete(&self, key: CacheKey, started_at: DateTime<Utc>, outcome: Outcome) {
        let waiters = {
            let mut state = self.lock();
            let waiters = state.finish_fetch(&key, outcome.is_ok(), started_at);
            if let Ok(payload) = &outcome {
                self.store.write_payload(key, payload.clone());
            }
            self.store.save_manifest(state.manifest());
            waiters
        };

        match &outcome {
            Ok(_) => debug!(%key, waiters = waiters.len(), "fetch completed"),
            Err(error) => debug!(%key, waiters = waiters.len(), %error, "fetch failed"),
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Completes the fetch for a key exactly once, even if the fetch task unwinds
struct InFlight {
    shared: Arc<Shared>,
    key: CacheKey,
    url: String,
    started_at: DateTime<Utc>,
    done: bool,
}

impl InFlight {
    fn finish(mut self, outcome: Outcome) {
        self.done = true;
        self.shared.complete(self.key, self.started_at, outcome);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            self.shared
                .complete(self.key, self.started_at, Err(aborted(&self.url)));
        }
    }
}

fn aborted(url: &str) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: "fetch was aborted before completing".to_string(),
    }
}

/// Deduplicating, expiring, persisted cache in front of a [`JsonFetcher`]
///
/// Cloning is cheap; clones share the same state and store.
#[derive(Clone)]
pub struct ResponseCache {
    shared: Arc<Shared>,
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    /// Creates a cache fetching through `fetcher` and persisting to `backend`
    ///
    /// The persisted manifest is not read until the first [`fetch`](Self::fetch).
    pub fn new<F, B>(fetcher: F, backend: B) -> Result<Self, StoreError>
    where
        F: JsonFetcher,
        B: CacheBackend,
    {
        Self::with_shared_fetcher(Arc::new(fetcher), backend)
    }

    pub fn with_shared_fetcher<B: CacheBackend>(
        fetcher: Arc<dyn JsonFetcher>,
        backend: B,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CacheState::default()),
                store: ManifestStore::spawn(backend)?,
                fetcher,
            }),
        })
    }

    /// Returns the JSON for `key`, fetching `url` only when needed
    ///
    /// * fresh entry: served from the store, no network call
    /// * fetch in flight: waits for that fetch and shares its outcome
    /// * missing or expired: fetches, stores the payload and keeps it fresh
    ///   for `ttl`
    ///
    /// A failed fetch leaves the key expired, so the next call retries.
    pub async fn fetch(&self, key: CacheKey, url: &str, ttl: Duration) -> Result<Value, FetchError> {
        loop {
            bootstrap::ensure_ready(&self.shared).await;

            let now = Utc::now();
            let pending = {
                let mut state = self.shared.lock();
                match state.lookup(&key, now) {
                    Lookup::Fresh => None,
                    Lookup::InFlight => {
                        debug!(%key, "joining in-flight fetch");
                        Some(state.join(key))
                    }
                    Lookup::Miss => {
                        debug!(%key, url, "cache miss, fetching");
                        let rx = state.begin_fetch(key, now, ttl);
                        self.shared.store.save_manifest(state.manifest());
                        self.spawn_fetch(key, url, now);
                        Some(rx)
                    }
                }
            };

            if let Some(rx) = pending {
                return rx.await.unwrap_or_else(|_| Err(aborted(url)));
            }

            match self.shared.store.read_payload(key).await {
                Ok(payload) => {
                    debug!(%key, "cache hit");
                    return Ok(payload);
                }
                Err(error) => {
                    // The network still has the data; fall back to a miss.
                    warn!(%key, %error, "cached payload unreadable, refetching");
                    let mut state = self.shared.lock();
                    if state.forget(&key) {
                        self.shared.store.save_manifest(state.manifest());
                    }
                }
            }
        }
    }

    /// Runs the network fetch on its own task so that it completes even if
    /// the caller that started it stops waiting
    fn spawn_fetch(&self, key: CacheKey, url: &str, started_at: DateTime<Utc>) {
        let flight = InFlight {
            shared: self.shared.clone(),
            key,
            url: url.to_string(),
            started_at,
            done: false,
        };
        tokio::spawn(async move {
            let outcome = flight.shared.fetcher.fetch_json(&flight.url).await;
            flight.finish(outcome);
        });
    }

    /// Current metadata for a key, if any
    pub fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.shared.lock().entry(key).copied()
    }

    /// Whether the persisted manifest has been loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.shared.lock().bootstrap, Bootstrap::Loaded)
    }

    /// Waits until every store write issued so far has been applied
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.shared.store.flush().await
    }

    #[cfg(test)]
    pub(super) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}
