//! Storage backends for the cache manifest and payloads
//!
//! Backends are plain synchronous stores; ordering and fire-and-forget
//! semantics are layered on top by [`super::store::ManifestStore`].

use directories::ProjectDirs;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use super::key::CacheKey;
use super::state::Manifest;

/// File name of the manifest inside the cache directory
const MANIFEST_FILE: &str = "manifest.json";

/// Errors raised by a cache backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing files failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Stored JSON could not be encoded or decoded
    #[error("cache data is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    /// No payload is stored for the key
    #[error("no cached payload for {0}")]
    Missing(CacheKey),

    /// The store worker has shut down
    #[error("cache store is closed")]
    Closed,

    /// The store was started outside a tokio runtime
    #[error("cache store needs a tokio runtime")]
    NoRuntime,
}

/// Durable storage for cache bookkeeping and payloads
pub trait CacheBackend: Send + 'static {
    /// Returns `Ok(None)` when no manifest has been saved yet
    fn load_manifest(&mut self) -> Result<Option<Manifest>, StoreError>;

    fn save_manifest(&mut self, manifest: &Manifest) -> Result<(), StoreError>;

    fn read_payload(&mut self, key: &CacheKey) -> Result<Value, StoreError>;

    fn write_payload(&mut self, key: &CacheKey, payload: &Value) -> Result<(), StoreError>;
}

/// Stores the manifest and payloads as JSON files on disk
///
/// Layout, relative to the cache directory (`~/.cache/scoreline/` on Linux):
///
/// ```text
/// manifest.json
/// competitions/1322.json
/// matches/all.json
/// ```
#[derive(Debug, Clone)]
pub struct DiskBackend {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl DiskBackend {
    /// Creates a new DiskBackend using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "scoreline")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new DiskBackend with a custom cache directory
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join(MANIFEST_FILE)
    }

    /// Returns the path of the payload file for a key
    pub fn payload_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join(key.resource.dir_name())
            .join(format!("{}.json", key.id))
    }

    fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl CacheBackend for DiskBackend {
    fn load_manifest(&mut self) -> Result<Option<Manifest>, StoreError> {
        let content = match fs::read_to_string(self.manifest_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save_manifest(&mut self, manifest: &Manifest) -> Result<(), StoreError> {
        Self::write_json(&self.manifest_path(), manifest)
    }

    fn read_payload(&mut self, key: &CacheKey) -> Result<Value, StoreError> {
        let content = match fs::read_to_string(self.payload_path(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(*key))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write_payload(&mut self, key: &CacheKey, payload: &Value) -> Result<(), StoreError> {
        Self::write_json(&self.payload_path(key), payload)
    }
}

#[derive(Debug, Default)]
struct MemoryContents {
    manifest: Option<Manifest>,
    payloads: HashMap<CacheKey, Value>,
}

/// Keeps the manifest and payloads in process memory
///
/// Clones share the same contents, so a clone can be kept around to inspect
/// what the cache persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    contents: Arc<Mutex<MemoryContents>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently saved manifest
    pub fn manifest(&self) -> Option<Manifest> {
        self.lock().manifest.clone()
    }

    /// The stored payload for a key
    pub fn payload(&self, key: &CacheKey) -> Option<Value> {
        self.lock().payloads.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryContents> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheBackend for MemoryBackend {
    fn load_manifest(&mut self) -> Result<Option<Manifest>, StoreError> {
        Ok(self.lock().manifest.clone())
    }

    fn save_manifest(&mut self, manifest: &Manifest) -> Result<(), StoreError> {
        self.lock().manifest = Some(manifest.clone());
        Ok(())
    }

    fn read_payload(&mut self, key: &CacheKey) -> Result<Value, StoreError> {
        self.lock()
            .payloads
            .get(key)
            .cloned()
            .ok_or(StoreError::Missing(*key))
    }

    fn write_payload(&mut self, key: &CacheKey, payload: &Value) -> Result<(), StoreError> {
        self.lock().payloads.insert(*key, payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::ResourceType;
    use crate::cache::state::CacheEntry;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_backend() -> (DiskBackend, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = DiskBackend::with_dir(temp_dir.path());
        (backend, temp_dir)
    }

    #[test]
    fn test_write_payload_creates_file_in_type_directory() {
        let (mut backend, temp_dir) = create_test_backend();
        let key = CacheKey::new(ResourceType::Team, 9002);

        backend
            .write_payload(&key, &json!({"team_id": "9002", "name": "Arsenal"}))
            .expect("Write should succeed");

        let expected_path = temp_dir.path().join("teams").join("9002.json");
        assert!(expected_path.exists(), "Payload file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"team_id\""));
        assert!(content.contains("\"Arsenal\""));
    }

    #[test]
    fn test_read_payload_missing_key() {
        let (mut backend, _temp_dir) = create_test_backend();
        let key = CacheKey::all(ResourceType::Match);

        let result = backend.read_payload(&key);

        assert!(matches!(result, Err(StoreError::Missing(k)) if k == key));
    }

    #[test]
    fn test_read_payload_returns_written_value() {
        let (mut backend, _temp_dir) = create_test_backend();
        let key = CacheKey::all(ResourceType::Competition);
        let payload = json!([{"id": "1322", "name": "Premier League", "region": "England"}]);

        backend.write_payload(&key, &payload).expect("Write should succeed");

        assert_eq!(backend.read_payload(&key).expect("Should read payload"), payload);
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        let (mut backend, temp_dir) = create_test_backend();
        let key = CacheKey::new(ResourceType::Player, 7);
        fs::create_dir_all(temp_dir.path().join("players")).unwrap();
        fs::write(temp_dir.path().join("players").join("7.json"), "{not json").unwrap();

        assert!(matches!(backend.read_payload(&key), Err(StoreError::Serde(_))));
    }

    #[test]
    fn test_overwrite_existing_payload() {
        let (mut backend, _temp_dir) = create_test_backend();
        let key = CacheKey::new(ResourceType::Standing, 1322);

        backend.write_payload(&key, &json!({"round": "1"})).unwrap();
        backend.write_payload(&key, &json!({"round": "2"})).unwrap();

        assert_eq!(backend.read_payload(&key).unwrap(), json!({"round": "2"}));
    }

    #[test]
    fn test_load_manifest_absent_is_none() {
        let (mut backend, _temp_dir) = create_test_backend();
        assert!(backend.load_manifest().expect("Absent manifest is not an error").is_none());
    }

    #[test]
    fn test_manifest_survives_roundtrip_and_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache");
        let mut backend = DiskBackend::with_dir(&nested_path);

        let mut manifest = Manifest::default();
        manifest.insert(
            CacheKey::new(ResourceType::Competition, 1322),
            CacheEntry {
                in_flight: false,
                expires_at: Utc::now(),
            },
        );
        backend.save_manifest(&manifest).expect("Save should succeed");

        assert!(nested_path.join("manifest.json").exists());
        assert_eq!(backend.load_manifest().unwrap(), Some(manifest));
    }

    #[test]
    fn test_corrupt_manifest_is_an_error() {
        let (mut backend, temp_dir) = create_test_backend();
        fs::write(temp_dir.path().join("manifest.json"), "[]").unwrap();

        assert!(backend.load_manifest().is_err());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(backend) = DiskBackend::new() {
            let path_str = backend.cache_dir().to_string_lossy();
            assert!(
                path_str.contains("scoreline"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_memory_backend_clones_share_contents() {
        let backend = MemoryBackend::new();
        let mut writer = backend.clone();
        let key = CacheKey::new(ResourceType::Team, 1);

        writer.write_payload(&key, &json!({"a": 1})).unwrap();
        writer.save_manifest(&Manifest::default()).unwrap();

        assert_eq!(backend.payload(&key), Some(json!({"a": 1})));
        assert_eq!(backend.manifest(), Some(Manifest::default()));
    }
}
