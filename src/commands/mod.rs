//! Command Handler Module
//!
//! This module implements the dispatch layer for FrameKV.
//! It receives decoded requests, executes them against the storage engine,
//! and returns appropriate responses.
//!
//! ## Architecture
//!
//! ```text
//! Frame body
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Payload codec  │  (protocol module)
//! └────────┬────────┘
//!          │ Request
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Requests
//!
//! - `Get`: payload with an absent or empty `value`
//! - `Set`: payload with a non-empty `value`

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
