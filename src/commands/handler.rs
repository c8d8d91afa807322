//! Command Handler Module
//!
//! This module implements the command dispatch layer for emberkv. It
//! receives one parsed [`Command`], performs exactly one storage or
//! snapshot call, and returns exactly one `\n`-terminated reply line.
//!
//! ## Architecture
//!
//! ```text
//! Client Request (one line)
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Check arity  │
//! │  - Execute      │
//! │  - Build reply  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ StorageEngine /  │  (storage + snapshot modules)
//! │ Snapshotter      │
//! └──────────────────┘
//! ```
//!
//! ## Reply Grammar
//!
//! | Command              | Success            | Failure                  |
//! |----------------------|--------------------|--------------------------|
//! | `SET key value`      | `OK`               | arity error              |
//! | `GET key`            | value              | `-1` if absent           |
//! | `DEL key`            | `1` / `0`          | arity error              |
//! | `HSET key field val` | `OK`               | arity error              |
//! | `HGET key field`     | value              | `-1` if absent           |
//! | `HDEL key field`     | `1` / `0`          | arity error              |
//! | `LADD key value`     | `OK`               | arity error              |
//! | `LGET key idx`       | value              | `-1` / non-numeric idx   |
//! | `LDEL key idx`       | `1` / `0`          | non-numeric idx          |
//! | `SAVE path format`   | `OK`               | `-1`                     |
//! | `LOAD path format`   | `OK`               | `-1`                     |
//! | anything else        | —                  | `ERROR: unknown command` |
//!
//! A write against a key holding a different variant replies `-1` and
//! mutates nothing. Wrong argument counts never touch the store.

use std::sync::Arc;

use crate::protocol::Command;
use crate::snapshot::{SnapshotFormat, Snapshotter};
use crate::storage::StorageEngine;

/// Handles parsed commands by dispatching them against the storage engine
/// and the snapshotter.
#[derive(Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
    /// Snapshot save/load over the same engine
    snapshotter: Snapshotter,
}

impl CommandHandler {
    /// Creates a new command handler over the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        let snapshotter = Snapshotter::new(Arc::clone(&storage));
        Self {
            storage,
            snapshotter,
        }
    }

    /// Executes a command and returns the reply line.
    ///
    /// Every call produces exactly one `\n`-terminated reply, including on
    /// error. Only SAVE/LOAD await; everything else completes under the
    /// store lock.
    pub async fn execute(&self, command: Command) -> String {
        let args = &command.args;

        match command.name.as_str() {
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),

            "HSET" => self.cmd_hset(args),
            "HGET" => self.cmd_hget(args),
            "HDEL" => self.cmd_hdel(args),

            "LADD" => self.cmd_ladd(args),
            "LGET" => self.cmd_lget(args),
            "LDEL" => self.cmd_ldel(args),

            "SAVE" => self.cmd_save(args).await,
            "LOAD" => self.cmd_load(args).await,

            _ => reply::unknown_command(),
        }
    }

    // ========================================================================
    // Scalar commands
    // ========================================================================

    /// SET key value
    fn cmd_set(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("SET");
        }
        match self.storage.set(&args[0], &args[1]) {
            true => reply::ok(),
            false => reply::not_found(),
        }
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> String {
        if args.len() != 1 {
            return reply::arity_error("GET");
        }
        reply::value(self.storage.get(&args[0]))
    }

    /// DEL key
    fn cmd_del(&self, args: &[String]) -> String {
        if args.len() != 1 {
            return reply::arity_error("DEL");
        }
        reply::flag(self.storage.del(&args[0]))
    }

    // ========================================================================
    // Hash commands
    // ========================================================================

    /// HSET key field value
    fn cmd_hset(&self, args: &[String]) -> String {
        if args.len() != 3 {
            return reply::arity_error("HSET");
        }
        match self.storage.hset(&args[0], &args[1], &args[2]) {
            true => reply::ok(),
            false => reply::not_found(),
        }
    }

    /// HGET key field
    fn cmd_hget(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("HGET");
        }
        reply::value(self.storage.hget(&args[0], &args[1]))
    }

    /// HDEL key field
    fn cmd_hdel(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("HDEL");
        }
        reply::flag(self.storage.hdel(&args[0], &args[1]))
    }

    // ========================================================================
    // List commands
    // ========================================================================

    /// LADD key value
    fn cmd_ladd(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("LADD");
        }
        match self.storage.ladd(&args[0], &args[1]) {
            true => reply::ok(),
            false => reply::not_found(),
        }
    }

    /// LGET key idx
    fn cmd_lget(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("LGET");
        }
        let idx: i64 = match args[1].parse() {
            Ok(idx) => idx,
            Err(_) => return reply::bad_index(),
        };
        if idx < 0 {
            return reply::not_found();
        }
        reply::value(self.storage.lget(&args[0], idx as usize))
    }

    /// LDEL key idx
    fn cmd_ldel(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("LDEL");
        }
        let idx: i64 = match args[1].parse() {
            Ok(idx) => idx,
            Err(_) => return reply::bad_index(),
        };
        if idx < 0 {
            return reply::flag(false);
        }
        reply::flag(self.storage.ldel(&args[0], idx as usize))
    }

    // ========================================================================
    // Snapshot commands
    // ========================================================================

    /// SAVE path format
    async fn cmd_save(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("SAVE");
        }
        let format: SnapshotFormat = match args[1].parse() {
            Ok(format) => format,
            Err(_) => return reply::not_found(),
        };
        match self.snapshotter.save(&args[0], format).await {
            Ok(()) => reply::ok(),
            Err(_) => reply::not_found(),
        }
    }

    /// LOAD path format
    async fn cmd_load(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return reply::arity_error("LOAD");
        }
        let format: SnapshotFormat = match args[1].parse() {
            Ok(format) => format,
            Err(_) => return reply::not_found(),
        };
        match self.snapshotter.load(&args[0], format).await {
            Ok(()) => reply::ok(),
            Err(_) => reply::not_found(),
        }
    }
}

/// Reply line constructors. Every reply is one `\n`-terminated line.
pub mod reply {
    /// `OK`
    pub fn ok() -> String {
        "OK\n".to_string()
    }

    /// `-1` — missing key/field/index, variant mismatch, or failed
    /// snapshot operation.
    pub fn not_found() -> String {
        "-1\n".to_string()
    }

    /// `1` or `0`
    pub fn flag(success: bool) -> String {
        if success { "1\n" } else { "0\n" }.to_string()
    }

    /// The value itself, or `-1` when absent.
    pub fn value(value: Option<String>) -> String {
        match value {
            Some(mut v) => {
                v.push('\n');
                v
            }
            None => not_found(),
        }
    }

    pub fn arity_error(name: &str) -> String {
        format!("ERROR: wrong number of arguments for {} command\n", name)
    }

    pub fn bad_index() -> String {
        "ERROR: index is not an integer\n".to_string()
    }

    pub fn unknown_command() -> String {
        "ERROR: unknown command\n".to_string()
    }

    pub fn invalid_command() -> String {
        "ERROR: invalid command\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol;

    fn handler() -> CommandHandler {
        CommandHandler::new(Arc::new(StorageEngine::new()))
    }

    async fn exec(handler: &CommandHandler, line: &str) -> String {
        let command = protocol::parse(line).expect("test line should tokenize");
        handler.execute(command).await
    }

    #[tokio::test]
    async fn test_set_get_del_scenario() {
        let handler = handler();

        assert_eq!(exec(&handler, "SET a 1").await, "OK\n");
        assert_eq!(exec(&handler, "GET a").await, "1\n");
        assert_eq!(exec(&handler, "DEL a").await, "1\n");
        assert_eq!(exec(&handler, "GET a").await, "-1\n");
    }

    #[tokio::test]
    async fn test_hash_scenario() {
        let handler = handler();

        assert_eq!(exec(&handler, "HSET h f v").await, "OK\n");
        assert_eq!(exec(&handler, "HGET h f").await, "v\n");
        assert_eq!(exec(&handler, "HDEL h f").await, "1\n");
        assert_eq!(exec(&handler, "HGET h f").await, "-1\n");
    }

    #[tokio::test]
    async fn test_list_commands() {
        let handler = handler();

        assert_eq!(exec(&handler, "LADD l a").await, "OK\n");
        assert_eq!(exec(&handler, "LADD l b").await, "OK\n");
        assert_eq!(exec(&handler, "LGET l 0").await, "a\n");
        assert_eq!(exec(&handler, "LGET l 1").await, "b\n");
        assert_eq!(exec(&handler, "LDEL l 0").await, "1\n");
        assert_eq!(exec(&handler, "LGET l 0").await, "b\n");
    }

    #[tokio::test]
    async fn test_lget_out_of_range_is_not_found() {
        let handler = handler();

        exec(&handler, "LADD l a").await;
        assert_eq!(exec(&handler, "LGET l 5").await, "-1\n");
        assert_eq!(exec(&handler, "LGET l -3").await, "-1\n");
        assert_eq!(exec(&handler, "LDEL l 5").await, "0\n");
        assert_eq!(exec(&handler, "LDEL l -3").await, "0\n");
    }

    #[tokio::test]
    async fn test_lget_non_numeric_index() {
        let handler = handler();

        exec(&handler, "LADD l a").await;
        assert_eq!(
            exec(&handler, "LGET l abc").await,
            "ERROR: index is not an integer\n"
        );
        assert_eq!(
            exec(&handler, "LDEL l abc").await,
            "ERROR: index is not an integer\n"
        );
    }

    #[tokio::test]
    async fn test_arity_errors_leave_store_unchanged() {
        let storage = Arc::new(StorageEngine::new());
        let handler = CommandHandler::new(Arc::clone(&storage));

        assert_eq!(
            exec(&handler, "SET onlykey").await,
            "ERROR: wrong number of arguments for SET command\n"
        );
        assert_eq!(
            exec(&handler, "GET").await,
            "ERROR: wrong number of arguments for GET command\n"
        );
        assert_eq!(
            exec(&handler, "HSET h f").await,
            "ERROR: wrong number of arguments for HSET command\n"
        );
        assert_eq!(
            exec(&handler, "DEL a b").await,
            "ERROR: wrong number of arguments for DEL command\n"
        );

        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let handler = handler();
        assert_eq!(exec(&handler, "FLUSH").await, "ERROR: unknown command\n");
    }

    #[tokio::test]
    async fn test_commands_are_case_insensitive() {
        let handler = handler();

        assert_eq!(exec(&handler, "set a 1").await, "OK\n");
        assert_eq!(exec(&handler, "gEt a").await, "1\n");
    }

    #[tokio::test]
    async fn test_type_isolation_at_the_wire() {
        let handler = handler();

        assert_eq!(exec(&handler, "HSET x f v").await, "OK\n");
        // GET of a hash key is not "v"; it is not found.
        assert_eq!(exec(&handler, "GET x").await, "-1\n");
        // Writes of another variant report failure without coercing.
        assert_eq!(exec(&handler, "SET x v").await, "-1\n");
        assert_eq!(exec(&handler, "LADD x v").await, "-1\n");
        assert_eq!(exec(&handler, "HGET x f").await, "v\n");
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.db").to_string_lossy().into_owned();

        let handler = handler();
        exec(&handler, "SET user ariel").await;
        exec(&handler, "HSET prefs tz UTC").await;
        exec(&handler, "LADD tags a").await;
        exec(&handler, "LADD tags b").await;

        assert_eq!(exec(&handler, &format!("SAVE {} custom", path)).await, "OK\n");

        // A fresh handler over a fresh engine, as after a restart.
        let restarted = CommandHandler::new(Arc::new(StorageEngine::new()));
        assert_eq!(
            exec(&restarted, &format!("LOAD {} custom", path)).await,
            "OK\n"
        );

        assert_eq!(exec(&restarted, "GET user").await, "ariel\n");
        assert_eq!(exec(&restarted, "HGET prefs tz").await, "UTC\n");
        assert_eq!(exec(&restarted, "LGET tags 0").await, "a\n");
        assert_eq!(exec(&restarted, "LGET tags 1").await, "b\n");
    }

    #[tokio::test]
    async fn test_save_rejects_unimplemented_and_unknown_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump").to_string_lossy().into_owned();

        let handler = handler();
        exec(&handler, "SET a 1").await;

        assert_eq!(exec(&handler, &format!("SAVE {} json", path)).await, "-1\n");
        assert_eq!(exec(&handler, &format!("SAVE {} csv", path)).await, "-1\n");
        assert_eq!(exec(&handler, &format!("SAVE {} xml", path)).await, "-1\n");
        assert_eq!(exec(&handler, &format!("LOAD {} json", path)).await, "-1\n");
    }

    #[tokio::test]
    async fn test_load_missing_file_fails_and_keeps_store() {
        let handler = handler();
        exec(&handler, "SET a 1").await;

        assert_eq!(exec(&handler, "LOAD /no/such/file custom").await, "-1\n");
        assert_eq!(exec(&handler, "GET a").await, "1\n");
    }
}
