//! Snapshot Persistence Module
//!
//! This module provides point-in-time save/restore of the full store to a
//! compact binary file, without stalling live traffic.
//!
//! ## Architecture
//!
//! ```text
//! SAVE path custom                 LOAD path custom
//!       │                                │
//!       ▼                                ▼
//! ┌─────────────────┐            ┌─────────────────┐
//! │ deep copy under │            │ read + decode   │
//! │ one brief lock  │            │ the whole file  │
//! └────────┬────────┘            └────────┬────────┘
//!          │ lock released                │ fully valid?
//!          ▼                              ▼
//! ┌─────────────────┐            ┌─────────────────┐
//! │ encode + write  │            │ replace_all     │
//! │ (tokio::fs)     │            │ (atomic swap)   │
//! └─────────────────┘            └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `codec`: the binary layout, strict decoder, and [`SnapshotFormat`]
//! - `snapshotter`: async save/load against a shared [`StorageEngine`]
//!
//! [`StorageEngine`]: crate::storage::StorageEngine

pub mod codec;
pub mod snapshotter;

// Re-export commonly used types
pub use codec::{SnapshotError, SnapshotFormat};
pub use snapshotter::Snapshotter;
