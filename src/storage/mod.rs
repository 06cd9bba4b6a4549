//! Storage Engine Module
//!
//! This module provides the shared store for FrameKV: a thread-safe,
//! sharded key-value map that every connection reads and writes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: 64 independent shards reduce lock contention
//! - **RwLock**: Multiple concurrent readers, exclusive writers
//! - **Upsert**: `set` creates a key or fully replaces its value
//!
//! ## Example
//!
//! ```
//! use framekv::storage::StorageEngine;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.set(Bytes::from("name"), Bytes::from("Ariz")).unwrap();
//! assert_eq!(engine.get(&Bytes::from("name")), Some(Bytes::from("Ariz")));
//! assert_eq!(engine.get(&Bytes::from("missing")), None);
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageStats, StoreError};
