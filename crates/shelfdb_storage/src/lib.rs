//! # ShelfDB Storage
//!
//! Storage backend trait and implementations for ShelfDB.
//!
//! This crate provides the lowest-level storage abstraction for ShelfDB.
//! Storage backends are **opaque blob stores**: one byte blob per
//! collection name, always replaced as a whole. They do not interpret the
//! data they store.
//!
//! ## Design Principles
//!
//! - Backends are simple blob stores (read, write, create, remove, list)
//! - No knowledge of serialization formats, records or collection modes
//! - Must be `Send + Sync` for concurrent access
//! - Whole-blob replacement is atomic with respect to readers
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - One file per blob inside a directory
//!
//! ## Example
//!
//! ```rust
//! use shelfdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! assert!(backend.create_if_absent("players", b"null").unwrap());
//! backend.write("players", b"[]").unwrap();
//! assert_eq!(backend.read("players").unwrap(), Some(b"[]".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_name, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
