//! Verify command implementation.

use shelfdb_core::{CoreResult, Database};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of collections checked.
    pub checked: usize,
    /// Collections that failed to decode, with the reason.
    pub corrupt: Vec<(String, String)>,
}

impl VerifyResult {
    /// Returns true if every collection decoded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Decodes every stored collection.
pub fn verify(db: &Database) -> CoreResult<VerifyResult> {
    let store = db.store();
    let mut result = VerifyResult::default();
    for name in db.collection_names()? {
        result.checked += 1;
        match store.peek(&name) {
            Ok(_) => {}
            Err(err) if err.is_corrupt_data() => result.corrupt.push((name, err.to_string())),
            Err(err) => return Err(err),
        }
    }
    Ok(result)
}

/// Runs the verify command.
pub fn run(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = db.path() {
        println!("Verifying database at {}", path.display());
    }
    println!();

    let result = verify(db)?;
    println!("  collections checked: {}, corrupt: {}", result.checked, result.corrupt.len());
    for (name, error) in &result.corrupt {
        println!("    ERROR: {name}: {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Database verification passed");
        Ok(())
    } else {
        println!("✗ Database verification failed");
        Err("Verification failed".into())
    }
}
