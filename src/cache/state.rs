//! In-memory cache bookkeeping and its persisted manifest form

use chrono::{DateTime, Duration, Utc};
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::key::{CacheKey, ResourceId, ResourceType};
use crate::fetch::FetchError;

/// Metadata kept for every key the cache has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// A fetch for this key is currently executing
    pub in_flight: bool,
    /// When the cached payload stops being fresh
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the payload for this entry may be served at `now`
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        !self.in_flight && now < self.expires_at
    }
}

/// The persisted record of all cache entries (payloads are stored separately)
///
/// Serialized as `{ "<type>": { "<id>": { "in_flight": .., "expires_at": .. } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<ResourceType, BTreeMap<ResourceId, CacheEntry>>,
}

impl Manifest {
    /// Builds a manifest from a flat key map
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a CacheKey, &'a CacheEntry)>) -> Self {
        let mut manifest = Manifest::default();
        for (key, entry) in entries {
            manifest.insert(*key, *entry);
        }
        manifest
    }

    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries
            .entry(key.resource)
            .or_default()
            .insert(key.id, entry);
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(&key.resource)?.get(&key.id)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every (key, entry) pair
    pub fn iter(&self) -> impl Iterator<Item = (CacheKey, &CacheEntry)> + '_ {
        self.entries.iter().flat_map(|(resource, ids)| {
            ids.iter().map(move |(id, entry)| {
                (
                    CacheKey {
                        resource: *resource,
                        id: *id,
                    },
                    entry,
                )
            })
        })
    }
}

/// Result delivered to everyone waiting on one fetch
pub(crate) type Outcome = Result<Value, FetchError>;

/// Load progress of the persisted manifest
#[derive(Debug, Default)]
pub(crate) enum Bootstrap {
    #[default]
    Unloaded,
    /// A load is running; every caller queued here is released once it ends
    Loading(Vec<oneshot::Sender<()>>),
    Loaded,
}

/// What the orchestrator should do for a key right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Never fetched, or expired
    Miss,
    /// Another caller is fetching it
    InFlight,
    /// Serve the stored payload
    Fresh,
}

/// All mutable cache state of one client instance
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    pub(crate) bootstrap: Bootstrap,
    entries: HashMap<CacheKey, CacheEntry>,
    waiters: HashMap<CacheKey, Vec<oneshot::Sender<Outcome>>>,
}

impl CacheState {
    pub(crate) fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Lookup {
        match self.entries.get(key) {
            None => Lookup::Miss,
            Some(entry) if entry.in_flight => Lookup::InFlight,
            Some(entry) if entry.is_fresh_at(now) => Lookup::Fresh,
            Some(_) => Lookup::Miss,
        }
    }

    pub(crate) fn entry(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Marks `key` in flight and registers the caller as its first waiter
    pub(crate) fn begin_fetch(
        &mut self,
        key: CacheKey,
        now: DateTime<Utc>,
        ttl: std::time::Duration,
    ) -> oneshot::Receiver<Outcome> {
        let expires_at = Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(
            key,
            CacheEntry {
                in_flight: true,
                expires_at,
            },
        );
        self.join(key)
    }

    /// Attaches a waiter to the fetch running for `key`
    pub(crate) fn join(&mut self, key: CacheKey) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.waiters.entry(key).or_default().push(tx);
        rx
    }

    /// Clears the in-flight flag and hands back everyone waiting on `key`
    ///
    /// A failed fetch rolls `expires_at` back to `started_at` so the next
    /// lookup is a miss instead of a stale hit.
    pub(crate) fn finish_fetch(
        &mut self,
        key: &CacheKey,
        succeeded: bool,
        started_at: DateTime<Utc>,
    ) -> Vec<oneshot::Sender<Outcome>> {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.in_flight = false;
            if !succeeded {
                entry.expires_at = started_at;
            }
        }
        self.waiters.remove(key).unwrap_or_default()
    }

    /// Drops the entry for `key` unless a fetch is running for it
    ///
    /// Returns whether anything changed.
    pub(crate) fn forget(&mut self, key: &CacheKey) -> bool {
        match self.entries.get(key) {
            Some(entry) if !entry.in_flight => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Replaces all entries with the loaded manifest
    ///
    /// Entries persisted mid-fetch have nobody left to complete them and are
    /// treated as misses.
    pub(crate) fn restore(&mut self, manifest: &Manifest) -> usize {
        self.entries = manifest
            .iter()
            .filter(|(_, entry)| !entry.in_flight)
            .map(|(key, entry)| (key, *entry))
            .collect();
        self.entries.len()
    }

    pub(crate) fn manifest(&self) -> Manifest {
        Manifest::from_entries(&self.entries)
    }
}
