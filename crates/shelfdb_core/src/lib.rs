//! # ShelfDB Core
//!
//! An embedded, file-backed JSON document store.
//!
//! This crate provides:
//! - Named collections, each persisted as one file holding its whole value
//! - List collections of records with store-assigned ids, and map
//!   collections of keyed values
//! - Per-collection write ordering: writes to one collection apply one at a
//!   time, in call order, even when issued concurrently
//! - Deep-path helpers for editing nested values
//!
//! ## Example
//!
//! ```rust,ignore
//! use shelfdb_core::{Database, Query};
//! use serde_json::json;
//!
//! let db = Database::open("data")?;
//! let players = db.collection("players")?;
//!
//! let ash = players.insert(json!({"name": "Ash"})).await?;
//! players.update(ash.id().unwrap(), json!({"badges": 1})).await?;
//!
//! let all = players.get(Query::all()).await?;
//! ```
//!
//! Writes return a [`Pending`] and must be issued from within a Tokio
//! runtime. Reads are async too; [`Collection::data_blocking`] and
//! [`Collection::get_blocking`] serve synchronous callers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
mod dir;
mod error;
mod lock;
mod snapshot;
mod types;
pub mod value;

pub use collection::{
    Collection, CollectionData, Query, Record, TypedCollection, UpsertTarget, ID_FIELD,
};
pub use config::Config;
pub use database::Database;
pub use dir::DatabaseDir;
pub use error::{CoreError, CoreResult};
pub use lock::{LockManager, Pending, GLOBAL_LOCK_KEY};
pub use snapshot::SnapshotStore;
pub use types::{CollectionMode, Key};

pub use shelfdb_codec::Format;
pub use serde_json::{json, Map, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
