// ---------------------------------------------------------------------------
// Storage backends: small synchronous memory store, large async file store
// ---------------------------------------------------------------------------
//
// Both backends sit behind the same async trait so the router can treat them
// uniformly; the memory store simply never suspends. Quota exhaustion is a
// distinct error variant because the router's fallback policy keys off it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Total quota of the fast in-memory store, roughly the budget of a small
/// synchronous browser-style store.
pub const DEFAULT_MEMORY_QUOTA_BYTES: usize = 256 * 1024;

/// File extension used by the bulk store.
const FILE_EXT: &str = "sav";

/// Which backend a payload ended up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    File,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::File => write!(f, "file"),
        }
    }
}

/// Errors a backend primitive can produce.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend's storage quota is exhausted.
    #[error("storage quota exceeded")]
    QuotaExceeded,
    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

/// A key-value store holding opaque payload bytes.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn write(&self, key: &str, payload: &[u8]) -> Result<(), BackendError>;

    /// `Ok(None)` on a missing key; errors are reserved for real failures.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    async fn keys(&self) -> Result<Vec<String>, BackendError>;

    async fn used_bytes(&self) -> Result<u64, BackendError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Small-quota synchronous store. Cheap to hit, quick to fill.
///
/// Clones share the same underlying map, which lets tests hold a handle to
/// storage a router owns.
#[derive(Clone)]
pub struct MemoryStore {
    quota_bytes: usize,
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            quota_bytes,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_default_quota() -> Self {
        Self::new(DEFAULT_MEMORY_QUOTA_BYTES)
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn write(&self, key: &str, payload: &[u8]) -> Result<(), BackendError> {
        let mut entries = self.entries.lock();
        let existing = entries.get(key).map(|v| v.len()).unwrap_or(0);
        let used: usize = entries.values().map(|v| v.len()).sum();
        if used - existing + payload.len() > self.quota_bytes {
            return Err(BackendError::QuotaExceeded);
        }
        entries.insert(key.to_string(), payload.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.entries.lock().keys().cloned().collect())
    }

    async fn used_bytes(&self) -> Result<u64, BackendError> {
        Ok(self.entries.lock().values().map(|v| v.len() as u64).sum())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// High-capacity file-backed store.
///
/// Payloads are lz4-compressed on disk and written with the write-rename
/// pattern: bytes go to `{path}.tmp`, are flushed with `sync_all`, then the
/// temp file is renamed over the final path. A crash mid-write leaves the
/// previous record intact.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{FILE_EXT}", escape_key(key)))
    }
}

/// Map a slot key to a filesystem-safe file stem. Alphanumerics, `-`, `_`
/// and `.` pass through; every other byte is percent-escaped. The mapping
/// is bijective so `keys()` can recover the exact slot name from the stem.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Invert [`escape_key`]. `None` for stems this store did not write.
fn unescape_key(stem: &str) -> Option<String> {
    let raw = stem.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            bytes.push(raw[i]);
            i += 1;
        }
    }
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl StorageBackend for FileStore {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn write(&self, key: &str, payload: &[u8]) -> Result<(), BackendError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BackendError::Other(format!("create dir: {e}")))?;

        let compressed = lz4_flex::compress_prepend_size(payload);
        let final_path = self.path_for(key);
        let tmp_path = final_path.with_extension(format!("{FILE_EXT}.tmp"));

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| BackendError::Other(format!("create temp file: {e}")))?;
        file.write_all(&compressed)
            .await
            .map_err(|e| BackendError::Other(format!("write: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| BackendError::Other(format!("sync: {e}")))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| BackendError::Other(format!("rename: {e}")))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let raw = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Other(format!("read: {e}"))),
        };
        // Fall back to the raw bytes for files written uncompressed.
        match lz4_flex::decompress_size_prepended(&raw) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(_) => Ok(Some(raw)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::Other(format!("delete: {e}"))),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackendError::Other(format!("read dir: {e}"))),
        };
        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BackendError::Other(format!("read dir entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXT) {
                if let Some(key) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(unescape_key)
                {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    async fn used_bytes(&self) -> Result<u64, BackendError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(BackendError::Other(format!("read dir: {e}"))),
        };
        let mut total = 0u64;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BackendError::Other(format!("read dir entry: {e}")))?
        {
            if let Ok(meta) = entry.metadata().await {
                total += meta.len();
            }
        }
        Ok(total)
    }
}
