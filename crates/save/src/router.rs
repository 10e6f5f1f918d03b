// ---------------------------------------------------------------------------
// Storage router: size-based choice between fast and bulk backends
// ---------------------------------------------------------------------------
//
// Small payloads prefer the fast store and spill to the bulk store when its
// quota fills; large payloads go straight to bulk. Reads probe fast first.
// The bulk backend is optional, so a router over a single store still works
// for every operation, it just has nowhere to spill.

use tracing::{debug, warn};

use crate::backend::{BackendError, BackendKind, StorageBackend};
use crate::error::SaveError;

/// Payloads at or above this size bypass the fast store entirely.
pub const DEFAULT_SIZE_THRESHOLD_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    pub size_threshold_bytes: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            size_threshold_bytes: DEFAULT_SIZE_THRESHOLD_BYTES,
        }
    }
}

/// Where a write landed and how big it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    pub backend: BackendKind,
    pub size_bytes: usize,
}

/// Aggregate usage across both backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterUsage {
    pub fast_bytes: u64,
    pub bulk_bytes: u64,
}

pub struct StorageRouter {
    fast: Box<dyn StorageBackend>,
    bulk: Option<Box<dyn StorageBackend>>,
    config: RouterConfig,
}

impl StorageRouter {
    pub fn new(fast: Box<dyn StorageBackend>, bulk: Option<Box<dyn StorageBackend>>) -> Self {
        Self::with_config(fast, bulk, RouterConfig::default())
    }

    pub fn with_config(
        fast: Box<dyn StorageBackend>,
        bulk: Option<Box<dyn StorageBackend>>,
        config: RouterConfig,
    ) -> Self {
        Self { fast, bulk, config }
    }

    /// Store a payload under a slot key, routing by size.
    pub async fn write(&self, key: &str, payload: &[u8]) -> Result<WriteReceipt, SaveError> {
        let size = payload.len();

        if size >= self.config.size_threshold_bytes {
            if let Some(bulk) = &self.bulk {
                bulk.write(key, payload).await.map_err(backend_error)?;
                debug!(key, size, backend = %bulk.kind(), "large payload routed to bulk store");
                return Ok(WriteReceipt {
                    backend: bulk.kind(),
                    size_bytes: size,
                });
            }
            // No bulk store configured; the fast store is the only option left.
            warn!(key, size, "no bulk backend for large payload, trying fast store");
        }

        match self.fast.write(key, payload).await {
            Ok(()) => Ok(WriteReceipt {
                backend: self.fast.kind(),
                size_bytes: size,
            }),
            Err(BackendError::QuotaExceeded) => {
                let Some(bulk) = &self.bulk else {
                    return Err(SaveError::Capacity(format!(
                        "fast store quota exhausted writing '{key}' and no bulk backend configured"
                    )));
                };
                warn!(key, size, "fast store quota exhausted, spilling to bulk store");
                bulk.write(key, payload).await.map_err(backend_error)?;
                Ok(WriteReceipt {
                    backend: bulk.kind(),
                    size_bytes: size,
                })
            }
            Err(other) => Err(backend_error(other)),
        }
    }

    /// Read a slot's payload, fast store first. Returns the payload and the
    /// backend that held it, or `None` if neither store has the key.
    pub async fn read(&self, key: &str) -> Result<Option<(Vec<u8>, BackendKind)>, SaveError> {
        match self.fast.read(key).await {
            Ok(Some(payload)) => return Ok(Some((payload, self.fast.kind()))),
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "fast store read failed, trying bulk store"),
        }

        if let Some(bulk) = &self.bulk {
            if let Some(payload) = bulk.read(key).await.map_err(backend_error)? {
                return Ok(Some((payload, bulk.kind())));
            }
        }
        Ok(None)
    }

    /// Remove a slot from both backends. Missing keys are not an error.
    pub async fn delete(&self, key: &str) -> Result<(), SaveError> {
        self.fast.delete(key).await.map_err(backend_error)?;
        if let Some(bulk) = &self.bulk {
            bulk.delete(key).await.map_err(backend_error)?;
        }
        Ok(())
    }

    /// Every slot key known to either backend, deduplicated and sorted.
    pub async fn keys(&self) -> Result<Vec<String>, SaveError> {
        let mut keys = self.fast.keys().await.map_err(backend_error)?;
        if let Some(bulk) = &self.bulk {
            keys.extend(bulk.keys().await.map_err(backend_error)?);
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    pub async fn usage(&self) -> Result<RouterUsage, SaveError> {
        let fast_bytes = self.fast.used_bytes().await.map_err(backend_error)?;
        let bulk_bytes = match &self.bulk {
            Some(bulk) => bulk.used_bytes().await.map_err(backend_error)?,
            None => 0,
        };
        Ok(RouterUsage {
            fast_bytes,
            bulk_bytes,
        })
    }
}

fn backend_error(e: BackendError) -> SaveError {
    match e {
        BackendError::QuotaExceeded => SaveError::Capacity("storage quota exceeded".to_string()),
        BackendError::Other(message) => SaveError::Backend(message),
    }
}
