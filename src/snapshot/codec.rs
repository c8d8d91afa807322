//! Binary Snapshot Codec
//!
//! Encoding and decoding of the full key space to the snapshot wire format.
//!
//! ## Binary Layout
//!
//! All integers are little-endian. A `string` is a `u32` length followed by
//! that many raw bytes, with no terminator.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ record_count(u32)│  record … record                             │
//! └──────────────────┴──────────────────────────────────────────────┘
//!
//! record:
//! ┌──────────┬────────────┬───────────────────────────────────────┐
//! │ tag (u8) │ key=string │ payload (by tag)                      │
//! └──────────┴────────────┴───────────────────────────────────────┘
//!
//! payload:
//!   Scalar (tag 0): value=string
//!   Hash   (tag 1): field_count(u32), then field=string value=string pairs
//!   List   (tag 3): item_count(u32), then item=string items
//! ```
//!
//! Decoding is strict: a short read, a string that overruns the buffer, or
//! an unrecognized tag aborts with an error and produces nothing. Callers
//! only apply a fully decoded map.

use std::collections::HashMap;
use std::str::FromStr;

use bytes::Buf;
use thiserror::Error;

use crate::storage::Value;

/// Type tag for a scalar record.
pub const TAG_SCALAR: u8 = 0;
/// Type tag for a hash record.
pub const TAG_HASH: u8 = 1;
/// Type tag for a list record.
pub const TAG_LIST: u8 = 3;

/// Errors that can occur while saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File open/read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream ended early or a length prefix overran it
    #[error("corrupt snapshot: {0}")]
    Corrupt(&'static str),

    /// A record carried a type tag this codec does not know
    #[error("corrupt snapshot: unknown type tag {0:#04x}")]
    UnknownTag(u8),

    /// The format name is not one of `custom`, `json`, `csv`
    #[error("unknown snapshot format '{0}'")]
    UnknownFormat(String),

    /// A recognized format with no codec behind it
    #[error("snapshot format '{0}' is not implemented")]
    NotImplemented(&'static str),
}

/// The on-disk formats a client may name in SAVE/LOAD.
///
/// Only [`SnapshotFormat::Custom`] (the binary layout above) is
/// implemented; naming `json` or `csv` fails explicitly rather than
/// silently falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Custom,
    Json,
    Csv,
}

impl SnapshotFormat {
    /// Returns the wire-level name of the format.
    pub fn name(&self) -> &'static str {
        match self {
            SnapshotFormat::Custom => "custom",
            SnapshotFormat::Json => "json",
            SnapshotFormat::Csv => "csv",
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "custom" => Ok(SnapshotFormat::Custom),
            "json" => Ok(SnapshotFormat::Json),
            "csv" => Ok(SnapshotFormat::Csv),
            other => Err(SnapshotError::UnknownFormat(other.to_string())),
        }
    }
}

/// Encodes the full key space into the binary snapshot layout.
pub fn encode(records: &HashMap<String, Value>) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u32(&mut buf, records.len() as u32);

    for (key, value) in records {
        match value {
            Value::Scalar(s) => {
                buf.push(TAG_SCALAR);
                put_string(&mut buf, key);
                put_string(&mut buf, s);
            }
            Value::Hash(hash) => {
                buf.push(TAG_HASH);
                put_string(&mut buf, key);
                put_u32(&mut buf, hash.len() as u32);
                for (field, value) in hash {
                    put_string(&mut buf, field);
                    put_string(&mut buf, value);
                }
            }
            Value::List(list) => {
                buf.push(TAG_LIST);
                put_string(&mut buf, key);
                put_u32(&mut buf, list.len() as u32);
                for item in list {
                    put_string(&mut buf, item);
                }
            }
        }
    }

    buf
}

/// Decodes a binary snapshot into a key space.
///
/// The whole stream is parsed before anything is returned; any malformed
/// input yields an error and no partial map.
pub fn decode(bytes: &[u8]) -> Result<HashMap<String, Value>, SnapshotError> {
    let mut buf = bytes;
    let record_count = get_u32(&mut buf, "record count")?;

    let mut records = HashMap::new();
    for _ in 0..record_count {
        let tag = get_u8(&mut buf)?;
        let key = get_string(&mut buf, "key")?;

        let value = match tag {
            TAG_SCALAR => Value::Scalar(get_string(&mut buf, "scalar value")?),
            TAG_HASH => {
                let field_count = get_u32(&mut buf, "hash field count")?;
                let mut hash = HashMap::new();
                for _ in 0..field_count {
                    let field = get_string(&mut buf, "hash field")?;
                    let value = get_string(&mut buf, "hash value")?;
                    hash.insert(field, value);
                }
                Value::Hash(hash)
            }
            TAG_LIST => {
                let item_count = get_u32(&mut buf, "list item count")?;
                let mut list = Vec::new();
                for _ in 0..item_count {
                    list.push(get_string(&mut buf, "list item")?);
                }
                Value::List(list)
            }
            other => return Err(SnapshotError::UnknownTag(other)),
        };

        records.insert(key, value);
    }

    Ok(records)
}

// ============================================================================
// Primitive readers/writers
// ============================================================================

fn put_u32(buf: &mut Vec<u8>, n: u32) {
    buf.extend_from_slice(&n.to_le_bytes());
}

fn put_string(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn get_u8(buf: &mut &[u8]) -> Result<u8, SnapshotError> {
    if buf.remaining() < 1 {
        return Err(SnapshotError::Corrupt("stream ended before type tag"));
    }
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut &[u8], what: &'static str) -> Result<u32, SnapshotError> {
    if buf.remaining() < 4 {
        return Err(SnapshotError::Corrupt(what));
    }
    Ok(buf.get_u32_le())
}

fn get_string(buf: &mut &[u8], what: &'static str) -> Result<String, SnapshotError> {
    let len = get_u32(buf, what)? as usize;
    if buf.remaining() < len {
        return Err(SnapshotError::Corrupt(what));
    }
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| SnapshotError::Corrupt(what))
}
