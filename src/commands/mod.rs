//! Command Dispatch Module
//!
//! This module implements the command processing layer for emberkv. It
//! maps each parsed command onto exactly one storage or snapshot call and
//! builds the single reply line the client sees.
//!
//! ## Supported Commands
//!
//! ### Scalar Commands
//! - `SET key value`, `GET key`, `DEL key`
//!
//! ### Hash Commands
//! - `HSET key field value`, `HGET key field`, `HDEL key field`
//!
//! ### List Commands
//! - `LADD key value`, `LGET key idx`, `LDEL key idx`
//!
//! ### Persistence Commands
//! - `SAVE path format`, `LOAD path format` (format: `custom`)

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
