//! Ordered, fire-and-forget access to a [`CacheBackend`]
//!
//! Every operation is queued to one blocking task that owns the backend and
//! applies operations strictly in the order they were issued. Writes return
//! immediately; reads resolve once every earlier write has been applied, so a
//! read can never observe data older than a write issued before it.

use futures::channel::oneshot;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::backend::{CacheBackend, StoreError};
use super::key::CacheKey;
use super::state::Manifest;

enum StoreOp {
    LoadManifest(oneshot::Sender<Result<Option<Manifest>, StoreError>>),
    SaveManifest(Manifest),
    ReadPayload(CacheKey, oneshot::Sender<Result<Value, StoreError>>),
    WritePayload(CacheKey, Value),
    Flush(oneshot::Sender<()>),
}

/// Handle to the store worker; the worker exits once the handle is dropped
#[derive(Debug)]
pub struct ManifestStore {
    ops: mpsc::UnboundedSender<StoreOp>,
}

impl ManifestStore {
    /// Starts the worker owning `backend` on the current tokio runtime's
    /// blocking pool
    pub fn spawn<B: CacheBackend>(backend: B) -> Result<Self, StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (ops, rx) = mpsc::unbounded_channel();
        runtime.spawn_blocking(move || run_worker(backend, rx));
        Ok(Self { ops })
    }

    pub async fn load_manifest(&self) -> Result<Option<Manifest>, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreOp::LoadManifest(tx))?;
        rx.await.map_err(|_| StoreError::Closed)?
    }

    /// Queues a manifest write
    pub fn save_manifest(&self, manifest: Manifest) {
        if self.send(StoreOp::SaveManifest(manifest)).is_err() {
            warn!("cache store closed, manifest not saved");
        }
    }

    pub async fn read_payload(&self, key: CacheKey) -> Result<Value, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreOp::ReadPayload(key, tx))?;
        rx.await.map_err(|_| StoreError::Closed)?
    }

    /// Queues a payload write
    pub fn write_payload(&self, key: CacheKey, payload: Value) {
        if self.send(StoreOp::WritePayload(key, payload)).is_err() {
            warn!(%key, "cache store closed, payload not saved");
        }
    }

    /// Resolves once every operation issued before it has been applied
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreOp::Flush(tx))?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    fn send(&self, op: StoreOp) -> Result<(), StoreError> {
        self.ops.send(op).map_err(|_| StoreError::Closed)
    }
}

fn run_worker<B: CacheBackend>(mut backend: B, mut ops: mpsc::UnboundedReceiver<StoreOp>) {
    // Write failures have no caller left to report to; the in-memory result
    // stays valid and a later write may succeed.
    while let Some(op) = ops.blocking_recv() {
        match op {
            StoreOp::LoadManifest(reply) => {
                let _ = reply.send(backend.load_manifest());
            }
            StoreOp::SaveManifest(manifest) => {
                if let Err(error) = backend.save_manifest(&manifest) {
                    warn!(%error, "failed to persist cache manifest");
                }
            }
            StoreOp::ReadPayload(key, reply) => {
                let _ = reply.send(backend.read_payload(&key));
            }
            StoreOp::WritePayload(key, payload) => {
                if let Err(error) = backend.write_payload(&key, &payload) {
                    warn!(%key, %error, "failed to persist cache payload");
                }
            }
            StoreOp::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
    debug!("cache store worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::MemoryBackend;
    use crate::cache::key::ResourceType;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    /// Backend that sleeps on writes, to catch reads overtaking writes
    struct SlowWrites {
        inner: MemoryBackend,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl CacheBackend for SlowWrites {
        fn load_manifest(&mut self) -> Result<Option<Manifest>, StoreError> {
            self.inner.load_manifest()
        }

        fn save_manifest(&mut self, manifest: &Manifest) -> Result<(), StoreError> {
            self.inner.save_manifest(manifest)
        }

        fn read_payload(&mut self, key: &CacheKey) -> Result<Value, StoreError> {
            self.log.lock().unwrap().push(format!("read {}", key));
            self.inner.read_payload(key)
        }

        fn write_payload(&mut self, key: &CacheKey, payload: &Value) -> Result<(), StoreError> {
            thread::sleep(Duration::from_millis(20));
            self.log.lock().unwrap().push(format!("write {} {}", key, payload));
            self.inner.write_payload(key, payload)
        }
    }

    #[tokio::test]
    async fn test_writes_apply_in_issue_order() {
        let backend = MemoryBackend::new();
        let store = ManifestStore::spawn(backend.clone()).unwrap();
        let key = CacheKey::new(ResourceType::Team, 9002);

        for round in 0..5 {
            store.write_payload(key, json!({ "round": round }));
        }

        assert_eq!(store.read_payload(key).await.unwrap(), json!({ "round": 4 }));
        assert_eq!(backend.payload(&key), Some(json!({ "round": 4 })));
    }

    #[tokio::test]
    async fn test_read_waits_for_earlier_slow_write() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let store = ManifestStore::spawn(SlowWrites {
            inner: MemoryBackend::new(),
            log: log.clone(),
        })
        .unwrap();
        let key = CacheKey::all(ResourceType::Match);

        store.write_payload(key, json!(1));
        let value = store.read_payload(key).await.unwrap();

        assert_eq!(value, json!(1));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["write match/all 1".to_string(), "read match/all".to_string()]
        );
    }

    #[tokio::test]
    async fn test_manifest_roundtrip_through_worker() {
        let store = ManifestStore::spawn(MemoryBackend::new()).unwrap();
        assert!(store.load_manifest().await.unwrap().is_none());

        store.save_manifest(Manifest::default());
        assert_eq!(store.load_manifest().await.unwrap(), Some(Manifest::default()));
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let result = ManifestStore::spawn(MemoryBackend::new());
        assert!(matches!(result, Err(StoreError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_flush_waits_for_queued_writes() {
        let backend = MemoryBackend::new();
        let store = ManifestStore::spawn(backend.clone()).unwrap();
        let key = CacheKey::new(ResourceType::Standing, 1204);

        store.write_payload(key, json!([1, 2, 3]));
        store.flush().await.unwrap();

        assert_eq!(backend.payload(&key), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_read_missing_payload() {
        let store = ManifestStore::spawn(MemoryBackend::new()).unwrap();
        let result = store.read_payload(CacheKey::new(ResourceType::Player, 1)).await;
        assert!(matches!(result, Err(StoreError::Missing(_))));
    }
}
