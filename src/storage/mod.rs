//! Storage Engine Module
//!
//! This module provides the core storage functionality for emberkv: a
//! thread-safe mapping from key to a polymorphic [`Value`], guarded by one
//! coarse-grained lock.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               StorageEngine                 │
//! │  ┌───────────────────────────────────────┐  │
//! │  │  Mutex<HashMap<String, Value>>        │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//!          ▲                        ▲
//!          │                        │
//!   connection tasks          snapshot layer
//!   (commands)                (save / load)
//! ```
//!
//! ## Features
//!
//! - **Coarse-Grained Exclusion**: one lock guards the entire map; all
//!   commands serialize through it
//! - **Polymorphic Values**: scalar, list, and hash variants as a tagged
//!   sum type with pattern-matched access
//! - **Type Isolation**: no operation ever converts a key from one variant
//!   to another
//! - **Bulk Paths**: `snapshot` (deep copy under a brief lock) and
//!   `replace_all` (atomic full overwrite) for the persistence layer
//!
//! ## Example
//!
//! ```
//! use emberkv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.set("name", "ariel");
//! assert_eq!(engine.get("name"), Some("ariel".to_string()));
//!
//! engine.hset("prefs", "tz", "UTC");
//! assert_eq!(engine.hget("prefs", "tz"), Some("UTC".to_string()));
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::{StorageEngine, Value};
