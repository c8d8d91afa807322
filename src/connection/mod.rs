//! Connection Management Module
//!
//! This module owns everything socket-shaped in emberkv: the listening
//! socket, the per-client connection state, and the capacity ceiling. Each
//! admitted client is handled by its own async task.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      serve() accept loop                    │
//! │      capacity check → admit or close with no reply          │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ spawn task per client
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ConnectionHandler                        │
//! │                                                             │
//! │  ┌────────────┐   ┌───────────────┐   ┌─────────────────┐   │
//! │  │ Read bytes │──>│ Frame lines + │──>│ Flush reply     │   │
//! │  │ (inbound)  │   │ dispatch      │   │ batch (outbound)│   │
//! │  └────────────┘   └───────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: one Tokio task per connection, no blocking waits
//! - **Explicit Accumulators**: partial reads and unsent replies live in
//!   per-connection `BytesMut` buffers, never hidden global state
//! - **Pipelining**: several commands in one TCP segment are answered in
//!   order, one reply per line
//! - **Capacity Ceiling**: at most [`MAX_CLIENTS`] concurrent clients;
//!   beyond that, new sockets are closed unreplied

pub mod handler;

// Re-export commonly used types
pub use handler::{
    handle_connection, serve, ConnectionError, ConnectionHandler, ConnectionStats, MAX_CLIENTS,
};
