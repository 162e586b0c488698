//! Drop command implementation.

use shelfdb_core::Database;
use tracing::info;

/// Runs the drop command.
pub async fn run(db: &Database, collection: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Dropping collection {:?} in {:?}", collection, db.path());
    if db.collection(collection)?.delete_collection().await? {
        println!("Dropped collection {collection:?}");
    } else {
        println!("No collection named {collection:?}");
    }
    Ok(())
}
