//! # ShelfDB Codec
//!
//! Snapshot serialization for ShelfDB.
//!
//! Every collection file holds one complete [`Value`]. This crate turns
//! values into bytes and back for the supported on-disk [`Format`]s:
//!
//! - [`Format::Json`] - the default, pretty-printed with two-space indents
//! - [`Format::Cbor`] - compact binary, via `ciborium`
//!
//! The empty sentinel is `null` in both formats.
//!
//! ## Usage
//!
//! ```
//! use shelfdb_codec::{Format, Value};
//! use serde_json::json;
//!
//! let value = json!([{"id": 1, "name": "Ash"}]);
//! let bytes = Format::Json.encode(&value, true).unwrap();
//! let decoded: Value = Format::Json.decode(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod format;

pub use error::{CodecError, CodecResult};
pub use format::Format;
pub use serde_json::{Map, Value};
