//! Purge command implementation.

use shelfdb_core::Database;
use tracing::info;

/// Runs the purge command. Refuses to run without confirmation.
pub async fn run(db: &Database, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        return Err("purge deletes every collection; pass --yes to confirm".into());
    }

    let names = db.collection_names()?;
    info!("Purging {} collection(s) from {:?}", names.len(), db.path());
    if db.delete_all().await? {
        println!("Deleted {} collection(s)", names.len());
    } else {
        println!("No collections to delete");
    }
    Ok(())
}
