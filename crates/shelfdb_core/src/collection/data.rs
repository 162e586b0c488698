//! The in-memory value of a collection.

use super::query::Query;
use super::record::Record;
use crate::error::{CoreError, CoreResult};
use crate::types::{CollectionMode, Key};
use crate::value::{type_name, Path};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// The whole value of one collection.
///
/// A collection starts out [`Empty`](Self::Empty) and takes its mode from
/// the first write.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CollectionData {
    /// Touched but never written. Persisted as `null`.
    #[default]
    Empty,
    /// An ordered list of records with unique ids.
    List(Vec<Record>),
    /// A key-value map.
    Map(Map<String, Value>),
}

impl CollectionData {
    /// Builds collection data from a decoded JSON value.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if the value is not `null`, an array or an object
    /// - `InvalidRecord` if an array element is not an acceptable record
    /// - `DuplicateId` if two records share an id
    pub fn from_value(collection: &str, value: Value) -> CoreResult<Self> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::Object(map) => Ok(Self::Map(map)),
            Value::Array(items) => {
                let mut seen = HashSet::with_capacity(items.len());
                let mut records = Vec::with_capacity(items.len());
                for item in items {
                    let record = Record::try_from(item)?;
                    if let Some(id) = record.id() {
                        if !seen.insert(id) {
                            return Err(CoreError::DuplicateId {
                                collection: collection.to_string(),
                                id,
                            });
                        }
                    }
                    records.push(record);
                }
                Ok(Self::List(records))
            }
            other => Err(CoreError::type_mismatch(format!(
                "collection {collection} must hold a list or a map, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Returns the value as JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::List(records) => {
                Value::Array(records.iter().map(|r| r.as_value().clone()).collect())
            }
            Self::Map(map) => Value::Object(map.clone()),
        }
    }

    /// Converts the value into JSON.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::List(records) => Value::Array(records.into_iter().map(Record::into_value).collect()),
            Self::Map(map) => Value::Object(map),
        }
    }

    /// Returns the mode, or `None` while the collection is empty.
    #[must_use]
    pub const fn mode(&self) -> Option<CollectionMode> {
        match self {
            Self::Empty => None,
            Self::List(_) => Some(CollectionMode::List),
            Self::Map(_) => Some(CollectionMode::Map),
        }
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub const fn is_empty_sentinel(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of records or entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::List(records) => records.len(),
            Self::Map(map) => map.len(),
        }
    }

    /// Returns true if there are no records or entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest record id, or 0.
    #[must_use]
    pub fn max_id(&self) -> u64 {
        match self {
            Self::List(records) => records.iter().filter_map(Record::id).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Record ids (list mode) or keys (map mode).
    ///
    /// Records without an id are skipped.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Self::Empty => Vec::new(),
            Self::List(records) => records.iter().filter_map(Record::id).map(Key::Id).collect(),
            Self::Map(map) => map.keys().cloned().map(Key::Name).collect(),
        }
    }

    /// Records (list mode) or entry values (map mode).
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Empty => Vec::new(),
            Self::List(records) => records.iter().map(|r| r.as_value().clone()).collect(),
            Self::Map(map) => map.values().cloned().collect(),
        }
    }

    /// Finds a record by id.
    #[must_use]
    pub fn record(&self, id: u64) -> Option<&Record> {
        match self {
            Self::List(records) => records.iter().find(|r| r.id() == Some(id)),
            _ => None,
        }
    }

    /// List mode: the array of records matching `query`. Map mode: the
    /// whole map, `query` is ignored. Empty: `[]`.
    #[must_use]
    pub fn select(&self, query: &Query) -> Value {
        match self {
            Self::Empty => Value::Array(Vec::new()),
            Self::List(records) => Value::Array(
                records
                    .iter()
                    .filter(|r| query.matches_record(r))
                    .map(|r| r.as_value().clone())
                    .collect(),
            ),
            Self::Map(map) => Value::Object(map.clone()),
        }
    }

    /// First record matching `query`.
    #[must_use]
    pub fn find(&self, query: &Query) -> Option<&Record> {
        match self {
            Self::List(records) => records.iter().find(|r| query.matches_record(r)),
            _ => None,
        }
    }

    /// List mode: number of records matching `query`. Map mode: number of
    /// entries.
    #[must_use]
    pub fn count(&self, query: &Query) -> usize {
        match self {
            Self::List(records) => records.iter().filter(|r| query.matches_record(r)).count(),
            _ => self.len(),
        }
    }

    /// List mode: whether a record matches. Map mode: whether the map has
    /// any entry.
    #[must_use]
    pub fn any(&self, query: &Query) -> bool {
        match self {
            Self::List(records) => records.iter().any(|r| query.matches_record(r)),
            _ => !self.is_empty(),
        }
    }

    /// Whether an element exists at `key`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for a name key on a list, or `InvalidPath`
    /// for a malformed map key.
    pub fn contains(&self, key: &Key) -> CoreResult<bool> {
        match self {
            Self::Empty => Ok(false),
            Self::List(_) => match key {
                Key::Id(id) => Ok(self.record(*id).is_some()),
                Key::Name(name) => Err(CoreError::type_mismatch(format!(
                    "list records are addressed by id, not {name:?}"
                ))),
            },
            Self::Map(_) => {
                let path = Path::parse(&key.to_path())?;
                Ok(!path.is_root() && self.lookup(&path).is_some())
            }
        }
    }

    /// First record (list mode).
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on a map.
    pub fn first(&self) -> CoreResult<Option<&Record>> {
        self.records("first").map(|records| records.first())
    }

    /// Last record (list mode).
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on a map.
    pub fn last(&self) -> CoreResult<Option<&Record>> {
        self.records("last").map(|records| records.last())
    }

    /// Looks up a deep path in the whole value.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<Value> {
        let Some(first) = path.segments().first() else {
            return match self {
                Self::Empty => None,
                data => Some(data.to_value()),
            };
        };
        let start = match self {
            Self::Empty => None,
            Self::List(records) => first
                .as_index()
                .and_then(|i| records.get(i))
                .map(Record::as_value),
            Self::Map(map) => map.get(&first.as_key()),
        }?;
        path.get_tail(start).cloned()
    }

    fn records(&self, operation: &str) -> CoreResult<&[Record]> {
        match self {
            Self::Empty => Ok(&[]),
            Self::List(records) => Ok(records),
            Self::Map(_) => Err(CoreError::type_mismatch(format!(
                "{operation} needs a list collection, found a map"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_empty() {
        let data = CollectionData::from_value("c", Value::Null).unwrap();
        assert_eq!(data, CollectionData::Empty);
        assert_eq!(data.mode(), None);
        assert_eq!(data.to_value(), Value::Null);
    }

    #[test]
    fn arrays_become_lists() {
        let data = CollectionData::from_value("players", json!([{"id": 1}, {"id": 3, "name": "Misty"}]))
            .unwrap();
        assert_eq!(data.mode(), Some(CollectionMode::List));
        assert_eq!(data.len(), 2);
        assert_eq!(data.max_id(), 3);
        assert_eq!(data.keys(), vec![Key::Id(1), Key::Id(3)]);
        assert_eq!(data.record(3).unwrap().get("name"), Some(&json!("Misty")));
    }

    #[test]
    fn objects_become_maps() {
        let data = CollectionData::from_value("config", json!({"b": 2, "a": 1})).unwrap();
        assert_eq!(data.mode(), Some(CollectionMode::Map));
        assert_eq!(data.keys(), vec![Key::from("a"), Key::from("b")]);
        assert_eq!(data.values(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn rejects_scalars() {
        let err = CollectionData::from_value("c", json!(42)).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CollectionData::from_value("c", json!([{"id": 1}, {"id": 1}])).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn rejects_non_record_elements() {
        let err = CollectionData::from_value("c", json!([{"id": 1}, 7])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { .. }));
    }

    #[test]
    fn round_trips_through_json() {
        let value = json!([{"id": 1, "name": "Ash"}, {"name": "no id yet"}]);
        let data = CollectionData::from_value("c", value.clone()).unwrap();
        assert_eq!(data.clone().into_value(), value);
        assert_eq!(data.to_value(), value);
    }

    #[test]
    fn select_and_count() {
        let data = CollectionData::from_value(
            "players",
            json!([{"id": 1, "team": "red"}, {"id": 2, "team": "blue"}, {"id": 3, "team": "red"}]),
        )
        .unwrap();
        let red = Query::matching(json!({"team": "red"}));
        assert_eq!(data.select(&red), json!([{"id": 1, "team": "red"}, {"id": 3, "team": "red"}]));
        assert_eq!(data.count(&red), 2);
        assert_eq!(data.count(&Query::all()), 3);
        assert_eq!(data.find(&red).and_then(Record::id), Some(1));
        assert!(data.any(&red));
        assert!(!data.any(&Query::matching(json!({"team": "green"}))));
    }

    #[test]
    fn empty_reads() {
        let data = CollectionData::Empty;
        assert_eq!(data.select(&Query::all()), json!([]));
        assert_eq!(data.count(&Query::all()), 0);
        assert!(!data.any(&Query::all()));
        assert!(!data.contains(&Key::Id(1)).unwrap());
        assert!(data.first().unwrap().is_none());
        assert_eq!(data.lookup(&Path::parse("a").unwrap()), None);
    }

    #[test]
    fn map_reads_ignore_queries() {
        let data = CollectionData::from_value("config", json!({"volume": 5})).unwrap();
        assert_eq!(data.select(&Query::matching(json!({"nope": 1}))), json!({"volume": 5}));
        assert_eq!(data.count(&Query::matching(json!({"nope": 1}))), 1);
        assert!(data.any(&Query::all()));
        assert!(data.first().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn contains_by_key_kind() {
        let list = CollectionData::from_value("c", json!([{"id": 4}])).unwrap();
        assert!(list.contains(&Key::Id(4)).unwrap());
        assert!(!list.contains(&Key::Id(5)).unwrap());
        assert!(list.contains(&Key::from("4")).unwrap_err().is_type_mismatch());

        let map = CollectionData::from_value("c", json!({"a": {"b": null}, "4": 1})).unwrap();
        assert!(map.contains(&Key::from("a.b")).unwrap());
        assert!(!map.contains(&Key::from("a.c")).unwrap());
        assert!(map.contains(&Key::Id(4)).unwrap());
    }

    #[test]
    fn first_last_and_lookup() {
        let list = CollectionData::from_value("c", json!([{"id": 1, "tags": ["x"]}, {"id": 2}])).unwrap();
        assert_eq!(list.first().unwrap().and_then(Record::id), Some(1));
        assert_eq!(list.last().unwrap().and_then(Record::id), Some(2));
        assert_eq!(list.lookup(&Path::parse("[0].tags[0]").unwrap()), Some(json!("x")));
        assert_eq!(list.lookup(&Path::parse("[5]").unwrap()), None);
        assert_eq!(list.lookup(&Path::root()), Some(list.to_value()));

        let map = CollectionData::from_value("c", json!({"settings": {"volume": 3}})).unwrap();
        assert_eq!(map.lookup(&Path::parse("settings.volume").unwrap()), Some(json!(3)));
    }
}
