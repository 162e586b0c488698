//! CLI command implementations.

pub mod drop;
pub mod list;
pub mod purge;
pub mod show;
pub mod verify;
