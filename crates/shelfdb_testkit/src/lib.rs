//! # ShelfDB Testkit
//!
//! Test utilities for ShelfDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - Stress helpers that hammer collections from many tasks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfdb_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_database() {
//!     let db = TestDatabase::file();
//!     let players = db.collection("players").unwrap();
//!     players.insert(json!({"name": "Ash"})).await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use shelfdb_core::json;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
