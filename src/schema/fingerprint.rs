//! Schema fingerprints and the store that remembers them.
//!
//! The store is shared by every document an engine sees. Check and update
//! happen under a single lock so concurrent documents with the same key never
//! both report a change for the same schema. A poisoned lock surfaces as
//! [`Error::LockPoisoned`].

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use md5::{Digest, Md5};

use crate::error::{Error, Result};

/// Identifies the schema stream of one document within one topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintKey {
    /// Topic the schema is published under
    pub topic: String,
    /// Document identity (usually the filename)
    pub identity: String,
}

impl FingerprintKey {
    /// Create a key.
    pub fn new(topic: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            identity: identity.into(),
        }
    }
}

/// 128-bit MD5 digest of a serialized schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Digest `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Md5::digest(bytes);
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Last fingerprint seen per key.
///
/// Unbounded by default. With a capacity, inserting a new key into a full
/// store evicts the least recently touched key.
#[derive(Debug)]
pub struct FingerprintStore {
    entries: Mutex<LruCache<FingerprintKey, Fingerprint>>,
    capacity: Option<NonZeroUsize>,
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            capacity: None,
        }
    }
}

impl FingerprintStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `capacity` keys (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: Some(cap),
        }
    }

    /// Maximum number of keys, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<FingerprintKey, Fingerprint>>> {
        self.entries
            .lock()
            .map_err(|e| Error::LockPoisoned(format!("Fingerprint store mutex poisoned: {}", e)))
    }

    /// Record `fingerprint` for `key` and report whether it differs from the
    /// previous one. A key seen for the first time counts as changed.
    pub fn check_and_update(&self, key: &FingerprintKey, fingerprint: Fingerprint) -> Result<bool> {
        let mut cache = self.lock()?;

        if let Some(existing) = cache.get_mut(key) {
            if *existing == fingerprint {
                return Ok(false);
            }
            *existing = fingerprint;
            return Ok(true);
        }

        if let Some((evicted, _)) = cache.push(key.clone(), fingerprint) {
            log::debug!(
                "FingerprintStore: evicting {}/{}",
                evicted.topic,
                evicted.identity
            );
        }
        Ok(true)
    }

    /// Get the last fingerprint recorded for `key` without touching it.
    pub fn get(&self, key: &FingerprintKey) -> Result<Option<Fingerprint>> {
        Ok(self.lock()?.peek(key).copied())
    }

    /// Forget `key`.
    pub fn remove(&self, key: &FingerprintKey) -> Result<Option<Fingerprint>> {
        Ok(self.lock()?.pop(key))
    }

    /// Number of keys held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if no key is held.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Forget every key.
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}
