//! Thread-Safe Storage Engine
//!
//! This module implements the shared store behind every connection.
//! It is a concurrent HashMap exposing exactly two protocol operations:
//! `get` and `set` (upsert).
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Instead of one big lock, we use multiple shards to reduce contention.
//! 2. **RwLock per shard**: Many concurrent readers, one writer at a time.
//! 3. **Whole-value replacement**: `set` swaps in a complete `Bytes` under the
//!    shard's write lock, so two writers racing on one key leave exactly one
//!    of their values behind.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are distributed across shards using a hash function.
//! This allows multiple worker threads to read/write different keys concurrently.

use bytes::Bytes;
use std::collections::{HashMap, TryReserveError};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Number of shards for the storage engine.
/// More shards = less lock contention, but more memory overhead.
const NUM_SHARDS: usize = 64;

/// Errors returned by a failed write.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shard could not grow to hold another key.
    #[error("out of memory: {0}")]
    Allocation(#[from] TryReserveError),
}

/// A single shard containing a portion of the key-value pairs.
#[derive(Debug, Default)]
struct Shard {
    data: RwLock<HashMap<Bytes, Bytes>>,
}

impl Shard {
    // HashMap::insert swaps whole `Bytes` handles, so a poisoned shard never
    // holds a torn value.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Bytes>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Bytes>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The main storage engine for FrameKV.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all connection tasks. All operations are thread-safe.
///
/// # Example
///
/// ```
/// use framekv::storage::StorageEngine;
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// // Set a key
/// engine.set(Bytes::from("name"), Bytes::from("Ariz")).unwrap();
///
/// // Get the value
/// let value = engine.get(&Bytes::from("name"));
/// assert_eq!(value, Some(Bytes::from("Ariz")));
/// ```
pub struct StorageEngine {
    /// Sharded storage for reduced lock contention
    shards: Vec<Shard>,

    /// Statistics: total number of keys
    key_count: AtomicU64,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a new, empty storage engine.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
        }
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Gets the shard for a given key.
    #[inline]
    fn get_shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Sets a key-value pair, replacing any previous value.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a new key was created, `Ok(false)` if an existing key was
    /// updated. Fails only if the shard cannot allocate room for a new key.
    pub fn set(&self, key: Bytes, value: Bytes) -> Result<bool, StoreError> {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut data = shard.write();

        let is_new = !data.contains_key(&key);
        if is_new {
            data.try_reserve(1)?;
        }
        data.insert(key, value);

        if is_new {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }

        Ok(is_new)
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key has never been written.
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let data = shard.read();
        data.get(key).cloned()
    }

    /// Returns the number of keys in the database.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.key_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
}
