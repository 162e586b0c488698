//! Benchmark utilities.

use serde_json::{json, Value};
use shelfdb_core::{Collection, Config, Database};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Builds the runtime benchmarks drive async calls on.
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

/// A record whose `payload` string is `payload_size` bytes long.
pub fn record(seq: usize, payload_size: usize) -> Value {
    json!({
        "name": format!("player-{seq}"),
        "badges": seq % 9,
        "payload": "x".repeat(payload_size),
    })
}

/// Generate a batch of records.
pub fn generate_records(count: usize, payload_size: usize) -> Vec<Value> {
    (0..count).map(|i| record(i, payload_size)).collect()
}

/// Opens a file-backed database in a fresh temporary directory.
///
/// Fsync is off so that benchmarks measure ShelfDB rather than the disk.
pub fn file_database() -> (Database, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = Config::default().sync_on_write(false);
    let db = Database::open_with_config(dir.path(), config).expect("Failed to open database");
    (db, dir)
}

/// Fills `collection` with `count` records.
pub fn populate(rt: &Runtime, collection: &Collection, count: usize, payload_size: usize) {
    rt.block_on(collection.bulk_insert(generate_records(count, payload_size)))
        .expect("Failed to populate collection");
}
