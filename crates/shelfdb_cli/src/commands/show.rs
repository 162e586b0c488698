//! Show command implementation.

use shelfdb_core::value::Path;
use shelfdb_core::{Database, Value};

/// Returns the value to print: the whole collection, or the value at
/// `path_expr` (`null` when absent).
pub fn lookup(
    db: &Database,
    collection: &str,
    path_expr: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    db.collection(collection)?;
    let data = db
        .store()
        .peek(collection)?
        .ok_or_else(|| format!("No collection named {collection:?}"))?;

    let value = match path_expr {
        Some(raw) => data.lookup(&Path::parse(raw)?).unwrap_or(Value::Null),
        None => data.into_value(),
    };
    Ok(value)
}

/// Runs the show command.
pub fn run(
    db: &Database,
    collection: &str,
    path_expr: Option<&str>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = lookup(db, collection, path_expr)?;
    if compact {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfdb_core::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn shows_whole_value_and_paths() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        db.collection("config")
            .unwrap()
            .set_in("settings.audio.volume", json!(7))
            .await
            .unwrap();

        let whole = lookup(&db, "config", None).unwrap();
        assert_eq!(whole, json!({"settings": {"audio": {"volume": 7}}}));

        let volume = lookup(&db, "config", Some("settings.audio.volume")).unwrap();
        assert_eq!(volume, json!(7));

        let missing = lookup(&db, "config", Some("settings.video")).unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn missing_collection_is_an_error() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        assert!(lookup(&db, "nothing", None).is_err());
        assert!(!dir.path().join("nothing.json").exists());
    }
}
