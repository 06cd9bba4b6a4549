//! # FrameKV - A Minimal Length-Framed In-Memory Key-Value Store
//!
//! FrameKV is a network-accessible key-value store written in Rust.
//! Clients send one length-framed protobuf request per connection and get a
//! short text reply back.
//!
//! ## Features
//!
//! - **Simple Framing**: 8-byte ASCII-decimal length header + protobuf body
//! - **Concurrent Store**: Sharded storage with RwLock for parallel access
//! - **Async I/O**: Built on Tokio's multi-threaded runtime
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              FrameKV                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │   Server    │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌──────────────────────────┐    ┌──────────────────────────────────┐   │
//! │  │  Frame header + Payload  │    │          StorageEngine           │   │
//! │  │  codec                   │    │  ┌────────┐ ┌────────┐ ┌──────┐  │   │
//! │  └──────────────────────────┘    │  │Shard 0 │ │Shard 1 │ │...N  │  │   │
//! │                                  │  │RwLock  │ │RwLock  │ │      │  │   │
//! │                                  │  └────────┘ └────────┘ └──────┘  │   │
//! │                                  └──────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Protocol
//!
//! ```text
//! request:  "00000014" 0a 05 "Hello" 12 05 "World"
//!           └ header ┘ └───────── body ──────────┘
//! reply:    "[OK] : Operation completed."   then the server closes
//! ```
//!
//! - A body with an absent or empty `value` is a read; the reply is the raw
//!   stored value, or `[NOK] : Key not found in DB.`
//! - A body with a non-empty `value` is a write; the reply is
//!   `[OK] : Operation completed.`
//! - A frame whose body is shorter than its header declares gets
//!   `[NOK] : wrong number of bytes received` and never reaches the store.
//!
//! ## Quick Start
//!
//! ```ignore
//! use framekv::server::Server;
//! use framekv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let server = Server::bind("127.0.0.1:12345", storage).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: Frame header, payload codec and response types
//! - [`storage`]: Thread-safe storage engine
//! - [`commands`]: Request dispatch onto the store
//! - [`connection`]: Per-connection state machine
//! - [`server`]: TCP listener
//! - [`client`]: Client speaking the same protocol
//!
//! ## Design Highlights
//!
//! ### Thread Safety
//!
//! The storage engine uses a sharded design with 64 independent RwLocks.
//! A write replaces a whole value under its shard's lock, so concurrent
//! writers to one key never leave a mix of their values behind.
//!
//! ### Connection Ownership
//!
//! Each connection's state lives in a handler owned by its task. Every read
//! and write is awaited from that task, so the state can never be dropped
//! while an operation on it is still pending.

pub mod client;
pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use client::{Client, ClientError};
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionError, ConnectionStats};
pub use protocol::{FrameError, Payload, Request, Response};
pub use server::Server;
pub use storage::{StorageEngine, StoreError};

/// The default port FrameKV listens on
pub const DEFAULT_PORT: u16 = 12345;

/// The default host FrameKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of FrameKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
