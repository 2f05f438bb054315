//! Response cache sitting between the API client and the network
//!
//! [`ResponseCache`] deduplicates concurrent requests for the same resource,
//! honors a per-request TTL, and persists both its bookkeeping (the manifest)
//! and the fetched payloads through a [`CacheBackend`] so they survive process
//! restarts. Lost or corrupt persisted data only ever turns into a cache miss.

mod backend;
mod bootstrap;
mod key;
mod response_cache;
mod state;
mod store;

pub use backend::{CacheBackend, DiskBackend, MemoryBackend, StoreError};
pub use key::{CacheKey, InvalidResourceId, ResourceId, ResourceType};
pub use response_cache::ResponseCache;
pub use state::{CacheEntry, Manifest};
pub use store::ManifestStore;
