//! Inventory key-set cache with content-based invalidation
//!
//! Holds at most one key set, tagged with the SHA-256 of the inventory
//! artifact it was built from. The artifact is read once per lookup; the
//! fingerprint and any rebuild both use that same buffer, so a key set is
//! never stored under another content's fingerprint. A lookup with different
//! artifact content rebuilds and replaces the entry. Concurrent misses each
//! build their own set; the last one stored wins.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use shelfsync_common::Result;
use tracing::{debug, info};

use super::InventoryKeySet;

struct CachedKeys {
    fingerprint: String,
    keys: Arc<InventoryKeySet>,
}

/// Single-entry cache of the inventory key set
#[derive(Default)]
pub struct KeySetCache {
    entry: Mutex<Option<CachedKeys>>,
}

impl KeySetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 of `content`
    pub fn fingerprint_bytes(content: &[u8]) -> String {
        format!("{:x}", Sha256::digest(content))
    }

    /// Cached key set for the artifact at `path`, or the result of `build`
    /// over the artifact's bytes when its content changed since the last build
    pub fn get_or_build<F>(&self, path: &Path, build: F) -> Result<Arc<InventoryKeySet>>
    where
        F: FnOnce(&[u8]) -> Result<InventoryKeySet>,
    {
        let content = fs::read(path)?;
        let fingerprint = Self::fingerprint_bytes(&content);

        if let Some(cached) = self.lock().as_ref() {
            if cached.fingerprint == fingerprint {
                debug!(fingerprint = %fingerprint, "Inventory key set cache hit");
                return Ok(Arc::clone(&cached.keys));
            }
        }

        let keys = Arc::new(build(&content)?);
        info!(
            fingerprint = %fingerprint,
            unique_keys = keys.len(),
            "Inventory key set rebuilt"
        );
        *self.lock() = Some(CachedKeys {
            fingerprint,
            keys: Arc::clone(&keys),
        });
        Ok(keys)
    }

    /// Fingerprint of the cached entry, if any
    pub fn fingerprint(&self) -> Option<String> {
        self.lock().as_ref().map(|c| c.fingerprint.clone())
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CachedKeys>> {
        // The entry is replaced whole, so a poisoned guard still holds a consistent value
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
