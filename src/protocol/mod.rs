//! Wire Protocol Implementation
//!
//! emberkv speaks a newline-terminated, whitespace-tokenized text protocol.
//!
//! ## Overview
//!
//! A request is one line: a case-insensitive command name followed by
//! positional arguments. A reply is one `\n`-terminated line. There is no
//! quoting and no binary framing.
//!
//! ```text
//! client: SET name ariel\n
//! server: OK\n
//! client: GET name\n
//! server: ariel\n
//! ```
//!
//! ## Modules
//!
//! - `parser`: line framing over a byte accumulator, plus tokenization
//!   into [`Command`]

pub mod parser;

// Re-export commonly used types for convenience
pub use parser::{next_line, parse, Command};
