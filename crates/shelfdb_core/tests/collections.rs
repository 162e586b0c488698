//! End-to-end behavior of list and map collections.

use serde::{Deserialize, Serialize};
use shelfdb_core::{json, CollectionMode, CoreError, Database, Key, Query, UpsertTarget, Value};

fn names(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn players_roster() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();

    for name in ["Ash", "Misty", "Brock"] {
        players.insert(json!({"name": name, "badges": 0})).await.unwrap();
    }
    assert_eq!(names(&players.get(Query::all()).await.unwrap()), ["Ash", "Misty", "Brock"]);

    let merged = players
        .update(2, json!({"badges": 2, "team": {"lead": "Starmie"}}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged, json!({"id": 2, "name": "Misty", "badges": 2, "team": {"lead": "Starmie"}}));

    assert!(players.remove(1).await.unwrap());
    assert!(!players.remove(1).await.unwrap());
    assert_eq!(players.update(1, json!({"badges": 1})).await.unwrap(), None);

    // Removed ids are not handed out again, even the largest one.
    let gary = players.insert(json!({"name": "Gary"})).await.unwrap();
    assert_eq!(gary.id(), Some(4));
    assert!(players.remove(4).await.unwrap());
    let gary = players.insert(json!({"name": "Gary"})).await.unwrap();
    assert_eq!(gary.id(), Some(5));

    let found = players
        .find_one(json!({"team": {"lead": "Starmie"}}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), Some(2));

    let veterans = Query::filter(|r: &Value| r["badges"].as_u64().unwrap_or(0) > 1);
    assert_eq!(players.count(veterans).await.unwrap(), 1);
    assert_eq!(players.first().await.unwrap().unwrap().id(), Some(2));
    assert_eq!(players.last().await.unwrap().unwrap().id(), Some(5));
    assert_eq!(
        players.keys().await.unwrap(),
        vec![Key::Id(2), Key::Id(3), Key::Id(5)]
    );
}

#[tokio::test]
async fn explicit_ids_are_kept_and_checked() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();

    let red = players.insert(json!({"id": 10, "name": "Red"})).await.unwrap();
    assert_eq!(red.id(), Some(10));
    let next = players.insert(json!({"id": 0, "name": "Blue"})).await.unwrap();
    assert_eq!(next.id(), Some(11));

    let err = players.insert(json!({"id": 10, "name": "Copy"})).await.unwrap_err();
    assert!(matches!(err, CoreError::DuplicateId { id: 10, .. }));

    let err = players.insert(json!("not a record")).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidRecord { .. }));

    let err = players.update(10, json!({"id": 12})).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidRecord { .. }));
}

#[tokio::test]
async fn config_map() {
    let db = Database::open_in_memory().unwrap();
    let config = db.collection("config").unwrap();

    config.insert_key("volume", json!(5)).await.unwrap();
    config
        .insert_key("theme", json!({"dark": true, "accent": "red"}))
        .await
        .unwrap();

    let theme = config
        .update("theme.accent", json!("blue"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(theme, json!("blue"));
    assert!(config.has("theme.dark").await.unwrap());
    assert!(!config.has("theme.font").await.unwrap());

    assert_eq!(
        config.get(Query::all()).await.unwrap(),
        json!({"theme": {"accent": "blue", "dark": true}, "volume": 5})
    );

    assert!(config.remove("theme.dark").await.unwrap());
    assert_eq!(config.get_in("theme", json!(null)).await.unwrap(), json!({"accent": "blue"}));
    assert_eq!(config.get_in("missing.key", json!(7)).await.unwrap(), json!(7));
    assert_eq!(config.count(Query::all()).await.unwrap(), 2);
}

#[tokio::test]
async fn modes_do_not_mix() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();
    let config = db.collection("config").unwrap();

    players.insert(json!({"name": "Ash"})).await.unwrap();
    config.insert_key("volume", json!(5)).await.unwrap();

    assert!(players.insert_key("x", json!(1)).await.unwrap_err().is_type_mismatch());
    assert!(config.insert(json!({"name": "Ash"})).await.unwrap_err().is_type_mismatch());
    assert!(config.first().await.unwrap_err().is_type_mismatch());
    assert!(players.has("name").await.unwrap_err().is_type_mismatch());

    // Failed writes leave the file untouched.
    assert_eq!(players.count(Query::all()).await.unwrap(), 1);
    assert_eq!(config.count(Query::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn untouched_collections_read_as_empty() {
    let db = Database::open_in_memory().unwrap();
    let fresh = db.collection("fresh").unwrap();

    assert_eq!(fresh.get(Query::all()).await.unwrap(), json!([]));
    assert_eq!(fresh.find_by_id(1).await.unwrap(), None);
    assert!(!fresh.exists(Query::all()).await.unwrap());
    assert_eq!(fresh.data().await.unwrap().mode(), None);

    // Reads create the file with the sentinel.
    assert_eq!(db.collection_names().unwrap(), vec!["fresh"]);

    // Either mode may claim it.
    fresh.insert_key("k", json!(1)).await.unwrap();
    assert_eq!(fresh.data().await.unwrap().mode(), Some(CollectionMode::Map));
}

#[tokio::test]
async fn upsert_by_query_and_key() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();
    let config = db.collection("config").unwrap();

    let ash = players.upsert(json!({"name": "Ash"}), json!({"name": "Ash", "badges": 1})).await.unwrap();
    assert_eq!(ash["id"], json!(1));
    let ash = players.upsert(json!({"name": "Ash"}), json!({"badges": 2})).await.unwrap();
    assert_eq!(ash, json!({"id": 1, "name": "Ash", "badges": 2}));

    // An id in the pattern selects by id alone.
    let by_id = players.upsert(json!({"id": 1, "name": "Nobody"}), json!({"badges": 3})).await.unwrap();
    assert_eq!(by_id["name"], json!("Ash"));
    assert_eq!(players.count(Query::all()).await.unwrap(), 1);

    config.upsert("audio.volume", json!(5)).await.unwrap();
    config.upsert("audio", json!({"muted": false})).await.unwrap();
    assert_eq!(
        config.get(Query::all()).await.unwrap(),
        json!({"audio": {"muted": false, "volume": 5}})
    );
}

#[tokio::test]
async fn bulk_upsert_updates_and_inserts() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();
    players.insert(json!({"name": "Ash", "badges": 1})).await.unwrap();

    let stored = players
        .bulk_upsert(vec![
            (UpsertTarget::from(json!({"name": "Ash"})), json!({"badges": 2})),
            (UpsertTarget::from(json!({"name": "Misty"})), json!({"name": "Misty", "badges": 1})),
            (UpsertTarget::from(json!({"id": 2})), json!({"badges": 3})),
        ])
        .await
        .unwrap();
    assert_eq!(
        stored,
        [
            json!({"id": 1, "name": "Ash", "badges": 2}),
            json!({"id": 2, "name": "Misty", "badges": 1}),
            json!({"id": 2, "name": "Misty", "badges": 3}),
        ]
    );
    assert_eq!(players.count(Query::all()).await.unwrap(), 2);

    let config = db.collection("config").unwrap();
    config.insert_key("audio", json!({"volume": 5})).await.unwrap();
    let stored = config
        .bulk_upsert(vec![
            (UpsertTarget::from("audio"), json!({"muted": true})),
            (UpsertTarget::from("theme.accent"), json!("red")),
        ])
        .await
        .unwrap();
    assert_eq!(stored, [json!({"volume": 5, "muted": true}), json!("red")]);
    assert_eq!(
        config.get(Query::all()).await.unwrap(),
        json!({"audio": {"volume": 5, "muted": true}, "theme": {"accent": "red"}})
    );

    // One failing item leaves the collection as it was.
    let err = config
        .bulk_upsert(vec![
            (UpsertTarget::from("fresh"), json!(1)),
            (UpsertTarget::from(json!({"name": "x"})), json!({})),
        ])
        .await
        .unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(!config.has("fresh").await.unwrap());
}

#[tokio::test]
async fn deep_path_helpers() {
    let db = Database::open_in_memory().unwrap();
    let config = db.collection("config").unwrap();

    config.set_in("server.ports", json!([80])).await.unwrap();
    assert_eq!(config.push_in("server.ports", json!(443)).await.unwrap(), 2);
    assert_eq!(config.push_in("server.hosts", json!("a")).await.unwrap(), 1);

    let merged = config.merge_in("server", json!({"tls": true})).await.unwrap();
    assert_eq!(merged["tls"], json!(true));

    let pulled = config.pull_in("server.ports", json!(80)).await.unwrap();
    assert_eq!(pulled, vec![json!(80)]);
    assert_eq!(config.get_in("server.ports[0]", json!(null)).await.unwrap(), json!(443));

    assert!(config.delete_in("server.hosts").await.unwrap());
    assert!(!config.delete_in("server.hosts").await.unwrap());

    assert!(config.set_in("a..b", json!(1)).await.is_err());

    let players = db.collection("players").unwrap();
    players.insert(json!({"name": "Ash", "bag": []})).await.unwrap();
    players.push_in("[0].bag", json!("potion")).await.unwrap();
    assert_eq!(
        players.get_in("[0].bag", json!(null)).await.unwrap(),
        json!(["potion"])
    );
}

#[tokio::test]
async fn bulk_writes_are_all_or_nothing() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap();

    let stored = players
        .bulk_insert(vec![json!({"name": "Ash"}), json!({"name": "Misty"})])
        .await
        .unwrap();
    assert_eq!(stored.iter().map(|r| r.id()).collect::<Vec<_>>(), [Some(1), Some(2)]);

    let err = players
        .bulk_insert(vec![json!({"name": "Brock"}), json!({"id": 1, "name": "Dup"})])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateId { .. }));
    assert_eq!(players.count(Query::all()).await.unwrap(), 2);

    let updated = players
        .bulk_update(vec![(Key::Id(1), json!({"badges": 1})), (Key::Id(9), json!({}))])
        .await
        .unwrap();
    assert!(updated[0].is_some());
    assert!(updated[1].is_none());

    let removed = players.bulk_remove(vec![Key::Id(2), Key::Id(2)]).await.unwrap();
    assert_eq!(removed, [true, false]);
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Player {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    name: String,
    #[serde(default)]
    badges: u32,
}

#[tokio::test]
async fn typed_collection() {
    let db = Database::open_in_memory().unwrap();
    let players = db.collection("players").unwrap().typed::<Player>();

    let ash = players
        .insert(&Player { id: None, name: "Ash".into(), badges: 0 })
        .await
        .unwrap();
    assert_eq!(ash.id, Some(1));

    let ash = players.update(1, json!({"badges": 8})).await.unwrap().unwrap();
    assert_eq!(ash.badges, 8);

    assert_eq!(players.find_by_id(1).await.unwrap(), Some(ash));
    assert_eq!(players.get_all().await.unwrap().len(), 1);
    assert!(players.remove(1).await.unwrap());
    assert!(players.get_all().await.unwrap().is_empty());

    // Records that do not fit the type surface as codec errors.
    players.untyped().insert(json!({"title": "no name"})).await.unwrap();
    assert!(matches!(players.get_all().await, Err(CoreError::Codec(_))));
}
