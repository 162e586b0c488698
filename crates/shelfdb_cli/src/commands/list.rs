//! List command implementation.

use serde::Serialize;
use shelfdb_core::{CollectionData, CoreResult, Database};

/// One row of the listing.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Collection name.
    pub name: String,
    /// `list`, `map`, `empty`, or `corrupt`.
    pub mode: String,
    /// Number of records or entries.
    pub size: usize,
}

/// Collects a summary of every stored collection.
pub fn summarize(db: &Database) -> CoreResult<Vec<CollectionSummary>> {
    let store = db.store();
    let mut summaries = Vec::new();
    for name in db.collection_names()? {
        let (mode, size) = match store.peek(&name) {
            Ok(Some(data)) => (mode_name(&data), data.len()),
            Ok(None) => continue,
            Err(err) if err.is_corrupt_data() => ("corrupt".to_string(), 0),
            Err(err) => return Err(err),
        };
        summaries.push(CollectionSummary { name, mode, size });
    }
    Ok(summaries)
}

fn mode_name(data: &CollectionData) -> String {
    data.mode()
        .map_or_else(|| "empty".to_string(), |mode| mode.to_string())
}

/// Runs the list command.
pub fn run(db: &Database, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summaries = summarize(db)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No collections");
        return Ok(());
    }

    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for summary in &summaries {
        println!(
            "{:<width$}  {:<7}  {}",
            summary.name, summary.mode, summary.size
        );
    }
    Ok(())
}
