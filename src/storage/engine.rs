//! Thread-Safe Polymorphic Storage Engine
//!
//! This module implements the core storage engine for emberkv: a single
//! `HashMap` from key to a tagged [`Value`], guarded by one process-wide
//! mutex.
//!
//! ## Design Decisions
//!
//! 1. **Coarse-Grained Lock**: One `Mutex` guards the entire map. Every
//!    operation acquires it for its full duration; concurrent callers
//!    serialize. There is no per-key locking and no reader/writer split.
//! 2. **Tagged Values**: A key holds exactly one [`Value`] variant at a
//!    time. Access is pattern-matched at every call site; an operation
//!    against the wrong variant fails instead of reinterpreting the data.
//! 3. **Create-On-First-Use**: `hset` and `ladd` create the hash/list when
//!    the key is absent.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               StorageEngine                 │
//! │  ┌───────────────────────────────────────┐  │
//! │  │               Mutex                   │  │
//! │  │   HashMap<String, Value>              │  │
//! │  │     "user"  -> Scalar("ariel")        │  │
//! │  │     "tags"  -> List(["a", "b"])       │  │
//! │  │     "prefs" -> Hash({"tz": "UTC"})    │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All connection tasks share one engine through an `Arc`; the mutex is the
//! only synchronization point.

use std::collections::HashMap;
use std::sync::Mutex;

/// A stored value. Each key holds exactly one variant; the variant is fixed
/// until the key is deleted.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single string value.
    Scalar(String),
    /// An ordered, index-addressable sequence of strings.
    List(Vec<String>),
    /// A field-to-value mapping with unique fields.
    Hash(HashMap<String, String>),
}

/// The main storage engine for emberkv.
///
/// # Thread Safety
///
/// This struct is designed to be wrapped in an `Arc` and shared across all
/// client handler tasks. Every operation takes the internal lock, so all
/// access is serialized.
///
/// # Example
///
/// ```
/// use emberkv::storage::StorageEngine;
///
/// let engine = StorageEngine::new();
///
/// engine.set("name", "ariel");
/// assert_eq!(engine.get("name"), Some("ariel".to_string()));
///
/// engine.ladd("tags", "alpha");
/// assert_eq!(engine.lget("tags", 0), Some("alpha".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct StorageEngine {
    /// The key space. One lock for the whole map.
    map: Mutex<HashMap<String, Value>>,
}

impl StorageEngine {
    /// Creates a new, empty storage engine.
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Scalar operations
    // ========================================================================

    /// Sets a key to a scalar value.
    ///
    /// Overwrites an existing scalar. If the key currently holds a list or
    /// hash, nothing is written.
    ///
    /// # Returns
    ///
    /// `true` if the value was stored, `false` if the key holds a different
    /// variant.
    pub fn set(&self, key: &str, value: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        match map.get_mut(key) {
            Some(Value::Scalar(existing)) => {
                *existing = value.to_string();
                true
            }
            Some(_) => false,
            None => {
                map.insert(key.to_string(), Value::Scalar(value.to_string()));
                true
            }
        }
    }

    /// Gets the scalar value for a key.
    ///
    /// Returns `None` if the key is absent or holds a list/hash.
    pub fn get(&self, key: &str) -> Option<String> {
        let map = self.map.lock().unwrap();
        match map.get(key) {
            Some(Value::Scalar(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Deletes a key of any variant.
    ///
    /// # Returns
    ///
    /// `true` if the key was deleted, `false` if it didn't exist.
    pub fn del(&self, key: &str) -> bool {
        self.map.lock().unwrap().remove(key).is_some()
    }

    // ========================================================================
    // Hash operations
    // ========================================================================

    /// Sets a field in the hash stored at a key.
    ///
    /// Creates the hash on first use if the key is absent.
    ///
    /// # Returns
    ///
    /// `true` if the field was stored, `false` if the key holds a different
    /// variant.
    pub fn hset(&self, key: &str, field: &str, value: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        match map
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(HashMap::new()))
        {
            Value::Hash(hash) => {
                hash.insert(field.to_string(), value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Gets a field from the hash stored at a key.
    ///
    /// Returns `None` if the key is absent, holds a different variant, or
    /// the field is missing.
    pub fn hget(&self, key: &str, field: &str) -> Option<String> {
        let map = self.map.lock().unwrap();
        match map.get(key) {
            Some(Value::Hash(hash)) => hash.get(field).cloned(),
            _ => None,
        }
    }

    /// Deletes a field from the hash stored at a key.
    ///
    /// # Returns
    ///
    /// `true` if the field was removed, `false` otherwise.
    pub fn hdel(&self, key: &str, field: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        match map.get_mut(key) {
            Some(Value::Hash(hash)) => hash.remove(field).is_some(),
            _ => false,
        }
    }

    // ========================================================================
    // List operations
    // ========================================================================

    /// Appends a value to the list stored at a key.
    ///
    /// Creates the list on first use if the key is absent.
    ///
    /// # Returns
    ///
    /// `true` if the value was appended, `false` if the key holds a
    /// different variant.
    pub fn ladd(&self, key: &str, value: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        match map
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(list) => {
                list.push(value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Gets the element at `idx` in the list stored at a key.
    ///
    /// Any index outside `[0, len)` is "not found", never a fault.
    pub fn lget(&self, key: &str, idx: usize) -> Option<String> {
        let map = self.map.lock().unwrap();
        match map.get(key) {
            Some(Value::List(list)) => list.get(idx).cloned(),
            _ => None,
        }
    }

    /// Removes the element at `idx` from the list stored at a key.
    ///
    /// # Returns
    ///
    /// `true` if an element was removed, `false` for a missing key, wrong
    /// variant, or an index outside `[0, len)`.
    pub fn ldel(&self, key: &str, idx: usize) -> bool {
        let mut map = self.map.lock().unwrap();
        match map.get_mut(key) {
            Some(Value::List(list)) if idx < list.len() => {
                list.remove(idx);
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Visits every (key, value) pair under a single lock acquisition.
    ///
    /// The visitor sees a frozen view: the lock is held for the entire
    /// traversal, so no command can interleave.
    pub fn visit_all<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &Value),
    {
        let map = self.map.lock().unwrap();
        for (key, value) in map.iter() {
            visitor(key, value);
        }
    }

    /// Returns a deep copy of the entire key space.
    ///
    /// The lock is held only for the duration of the clone, letting callers
    /// (snapshot save) work on the copy without stalling commands.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.map.lock().unwrap().clone()
    }

    /// Replaces the entire key space, discarding all prior content.
    ///
    /// This is the sole bulk-overwrite path and the target of LOAD.
    pub fn replace_all(&self, new_map: HashMap<String, Value>) {
        *self.map.lock().unwrap() = new_map;
    }
}
