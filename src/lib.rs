//! # emberkv - A Minimal In-Memory Key-Value Store
//!
//! emberkv is a single-node, in-memory key-value store speaking a textual
//! line protocol over TCP, with point-in-time binary snapshots.
//!
//! ## Features
//!
//! - **Line Protocol**: newline-terminated, whitespace-tokenized text
//!   commands; one reply line per request
//! - **Polymorphic Values**: a key holds a scalar, a list, or a hash, and
//!   never silently changes variant
//! - **Coarse-Grained Concurrency**: one lock around the whole store; all
//!   commands serialize through it
//! - **Non-Stalling Snapshots**: SAVE copies the store under a brief lock
//!   and writes to disk lock-free; LOAD replaces the store only after a
//!   fully valid parse
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             emberkv                              │
//! │                                                                  │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────┐      │
//! │  │ TCP accept  │───>│ Connection   │───>│ CommandHandler  │      │
//! │  │ loop        │    │ Handler      │    │ (dispatch)      │      │
//! │  └─────────────┘    └──────────────┘    └────────┬────────┘      │
//! │                                                  │               │
//! │                        ┌─────────────────────────┼──────────┐    │
//! │                        ▼                         ▼          │    │
//! │  ┌──────────────────────────────┐    ┌──────────────────┐   │    │
//! │  │        StorageEngine         │<───│   Snapshotter    │   │    │
//! │  │  Mutex<HashMap<String,       │    │  (save / load)   │   │    │
//! │  │        Value>>               │    └──────────────────┘   │    │
//! │  └──────────────────────────────┘                           │    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use emberkv::connection::{serve, ConnectionStats, MAX_CLIENTS};
//! use emberkv::storage::StorageEngine;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(StorageEngine::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     serve(listener, storage, stats, MAX_CLIENTS).await;
//! }
//! ```
//!
//! ## Wire Protocol
//!
//! ```text
//! SET key value          -> OK
//! GET key                -> value | -1
//! DEL key                -> 1 | 0
//! HSET key field value   -> OK
//! HGET key field         -> value | -1
//! HDEL key field         -> 1 | 0
//! LADD key value         -> OK
//! LGET key idx           -> value | -1
//! LDEL key idx           -> 1 | 0
//! SAVE path custom       -> OK | -1
//! LOAD path custom       -> OK | -1
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: line framing and command tokenization
//! - [`storage`]: the lock-guarded polymorphic store
//! - [`snapshot`]: binary snapshot codec and save/load orchestration
//! - [`commands`]: command dispatch and reply building
//! - [`connection`]: accept loop, per-client tasks, capacity ceiling

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod snapshot;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, serve, ConnectionStats, MAX_CLIENTS};
pub use protocol::Command;
pub use snapshot::{SnapshotError, SnapshotFormat, Snapshotter};
pub use storage::{StorageEngine, Value};

/// The default port emberkv listens on
pub const DEFAULT_PORT: u16 = 3000;

/// The interface emberkv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of emberkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
