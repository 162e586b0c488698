//! In-memory mutation of a collection value.
//!
//! Every mutating [`Collection`](super::Collection) operation loads the
//! collection, applies one or more edits through an [`Editor`] and saves
//! the result if anything changed. The editor itself does no I/O, which
//! keeps the rules for ids, modes and merging testable in isolation.

use super::data::CollectionData;
use super::query::Query;
use super::record::Record;
use crate::error::{CoreError, CoreResult};
use crate::types::{CollectionMode, Key};
use crate::value::{merge, type_name, Path};
use serde_json::{Map, Value};

/// Where an upsert looks for an existing element.
#[derive(Debug, Clone)]
pub enum UpsertTarget {
    /// List mode: the record with the pattern's `id`, or else the first
    /// record matching the query.
    Query(Query),
    /// Map mode: the value at this key or dotted path.
    Key(String),
}

impl From<Query> for UpsertTarget {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl From<Value> for UpsertTarget {
    fn from(pattern: Value) -> Self {
        Self::Query(Query::Match(pattern))
    }
}

impl From<&str> for UpsertTarget {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for UpsertTarget {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// Applies edits to a loaded collection value.
///
/// After an edit returns an error the editor must be discarded; its value
/// is not saved.
#[derive(Debug)]
pub(crate) struct Editor<'a> {
    collection: &'a str,
    data: CollectionData,
    high_water: u64,
    changed: bool,
}

impl<'a> Editor<'a> {
    /// Starts editing `data`. `high_water` is the largest id this handle
    /// has ever assigned.
    pub(crate) fn new(collection: &'a str, data: CollectionData, high_water: u64) -> Self {
        let high_water = high_water.max(data.max_id());
        Self {
            collection,
            data,
            high_water,
            changed: false,
        }
    }

    /// Returns true if any edit modified the value.
    pub(crate) const fn changed(&self) -> bool {
        self.changed
    }

    /// Returns the edited value and the new high-water mark.
    pub(crate) fn finish(self) -> (CollectionData, u64) {
        (self.data, self.high_water)
    }

    /// Appends a record, assigning an id if it has none.
    pub(crate) fn insert(&mut self, record: Value) -> CoreResult<Record> {
        let mut record = Record::try_from(record)?;
        let next = self.high_water.checked_add(1).ok_or_else(|| {
            CoreError::invalid_record(format!(
                "collection {} has used up its ids; pass an explicit id",
                self.collection
            ))
        });
        let collection = self.collection;
        let records = self.list_mut("insert a record")?;

        let id = match record.id() {
            Some(id) => {
                if records.iter().any(|r| r.id() == Some(id)) {
                    return Err(CoreError::DuplicateId {
                        collection: collection.to_string(),
                        id,
                    });
                }
                id
            }
            None => {
                let next = next?;
                record.set_id(next);
                next
            }
        };

        records.push(record.clone());
        self.high_water = self.high_water.max(id);
        self.changed = true;
        Ok(record)
    }

    /// Stores `value` under the plain key `key`.
    pub(crate) fn insert_key(&mut self, key: String, value: Value) -> CoreResult<Value> {
        self.map_mut("insert a keyed value")?.insert(key, value.clone());
        self.changed = true;
        Ok(value)
    }

    /// Merges `patch` into the element at `key`.
    pub(crate) fn update(&mut self, key: &Key, patch: Value) -> CoreResult<Option<Value>> {
        let updated = match &mut self.data {
            CollectionData::Empty => None,
            CollectionData::List(records) => {
                let id = record_id(self.collection, key)?;
                match records.iter().position(|r| r.id() == Some(id)) {
                    Some(index) => Some(merge_record(records, index, patch)?),
                    None => None,
                }
            }
            CollectionData::Map(map) => {
                let path = key_path(key)?;
                with_object(map, |root| {
                    path.get_mut(root).map(|target| {
                        merge(target, patch);
                        target.clone()
                    })
                })
            }
        };
        self.changed |= updated.is_some();
        Ok(updated)
    }

    /// Removes the element at `key`.
    pub(crate) fn remove(&mut self, key: &Key) -> CoreResult<bool> {
        let removed = match &mut self.data {
            CollectionData::Empty => false,
            CollectionData::List(records) => {
                let id = record_id(self.collection, key)?;
                match records.iter().position(|r| r.id() == Some(id)) {
                    Some(index) => {
                        records.remove(index);
                        true
                    }
                    None => false,
                }
            }
            CollectionData::Map(map) => {
                let path = key_path(key)?;
                with_object(map, |root| path.unset(root))
            }
        };
        self.changed |= removed;
        Ok(removed)
    }

    /// Updates the element `target` selects, or inserts `patch`.
    pub(crate) fn upsert(&mut self, target: &UpsertTarget, patch: Value) -> CoreResult<Value> {
        match target {
            UpsertTarget::Query(query) => {
                let records = self.list_mut("upsert by query")?;
                let found = match query.id_hint() {
                    Some(id) => records.iter().position(|r| r.id() == Some(id)),
                    None => records.iter().position(|r| query.matches_record(r)),
                };
                match found {
                    Some(index) => {
                        let value = merge_record(records, index, patch)?;
                        self.changed = true;
                        Ok(value)
                    }
                    None => self.insert(patch).map(Record::into_value),
                }
            }
            UpsertTarget::Key(key) => {
                let path = key_path(&Key::Name(key.clone()))?;
                let map = self.map_mut("upsert by key")?;
                let value = with_object(map, |root| -> CoreResult<Value> {
                    match path.get_mut(root) {
                        Some(existing) => {
                            merge(existing, patch);
                            Ok(existing.clone())
                        }
                        None => {
                            path.set(root, patch.clone())?;
                            Ok(patch)
                        }
                    }
                })?;
                self.changed = true;
                Ok(value)
            }
        }
    }

    /// Replaces the value with an empty list or map and forgets issued ids.
    pub(crate) fn clear(&mut self, mode: CollectionMode) {
        self.data = match mode {
            CollectionMode::List => CollectionData::List(Vec::new()),
            CollectionMode::Map => CollectionData::Map(Map::new()),
        };
        self.high_water = 0;
        self.changed = true;
    }

    /// Stores `value` at `path`.
    pub(crate) fn set_in(&mut self, path: &Path, value: Value) -> CoreResult<()> {
        self.edit_value(|root| path.set(root, value))?;
        self.changed = true;
        Ok(())
    }

    /// Deep-merges `value` into the value at `path`, which starts from an
    /// empty object when absent.
    pub(crate) fn merge_in(&mut self, path: &Path, value: Value) -> CoreResult<Value> {
        let merged = self.edit_value(|root| {
            let mut current = path
                .get(root)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            merge(&mut current, value);
            path.set(root, current.clone())?;
            Ok(current)
        })?;
        self.changed = true;
        Ok(merged)
    }

    /// Appends `value` to the array at `path`. Returns the new length.
    pub(crate) fn push_in(&mut self, path: &Path, value: Value) -> CoreResult<usize> {
        let len = self.edit_value(|root| match path.get_mut(root) {
            None => {
                path.set(root, Value::Array(vec![value]))?;
                Ok(1)
            }
            Some(Value::Array(items)) => {
                items.push(value);
                Ok(items.len())
            }
            Some(other) => Err(not_an_array(path, other)),
        })?;
        self.changed = true;
        Ok(len)
    }

    /// Removes the elements of the array at `path` that match `query`.
    /// Returns the removed elements.
    pub(crate) fn pull_in(&mut self, path: &Path, query: &Query) -> CoreResult<Vec<Value>> {
        let pulled = self.edit_value(|root| match path.get_mut(root) {
            None => {
                path.set(root, Value::Array(Vec::new()))?;
                Ok(Vec::new())
            }
            Some(Value::Array(items)) => {
                let (pulled, kept): (Vec<Value>, Vec<Value>) = std::mem::take(items)
                    .into_iter()
                    .partition(|item| query.matches(item));
                *items = kept;
                Ok(pulled)
            }
            Some(other) => Err(not_an_array(path, other)),
        })?;
        self.changed = true;
        Ok(pulled)
    }

    /// Removes the value at `path`.
    pub(crate) fn delete_in(&mut self, path: &Path) -> CoreResult<bool> {
        if self.data.is_empty_sentinel() {
            return Ok(false);
        }
        let removed = self.edit_value(|root| Ok(path.unset(root)))?;
        self.changed |= removed;
        Ok(removed)
    }

    /// Replaces the value at `path` with `f(current)`.
    pub(crate) fn update_in<F>(&mut self, path: &Path, f: F) -> CoreResult<Value>
    where
        F: FnOnce(Option<Value>) -> Value,
    {
        let updated = self.edit_value(|root| {
            let updated = f(path.get(root).cloned());
            path.set(root, updated.clone())?;
            Ok(updated)
        })?;
        self.changed = true;
        Ok(updated)
    }

    /// Runs `f` on the whole value as JSON, then checks that the result is
    /// still a valid collection. The sentinel is edited as an empty map.
    fn edit_value<R>(&mut self, f: impl FnOnce(&mut Value) -> CoreResult<R>) -> CoreResult<R> {
        let mut root = match std::mem::take(&mut self.data) {
            CollectionData::Empty => Value::Object(Map::new()),
            data => data.into_value(),
        };
        let result = f(&mut root)?;
        self.data = CollectionData::from_value(self.collection, root).map_err(|err| match err {
            CoreError::InvalidRecord { message } => CoreError::type_mismatch(message),
            other => other,
        })?;
        self.high_water = self.high_water.max(self.data.max_id());
        Ok(result)
    }

    fn list_mut(&mut self, operation: &str) -> CoreResult<&mut Vec<Record>> {
        if self.data.is_empty_sentinel() {
            self.data = CollectionData::List(Vec::new());
        }
        match &mut self.data {
            CollectionData::List(records) => Ok(records),
            _ => Err(wrong_mode(self.collection, operation, CollectionMode::Map)),
        }
    }

    fn map_mut(&mut self, operation: &str) -> CoreResult<&mut Map<String, Value>> {
        if self.data.is_empty_sentinel() {
            self.data = CollectionData::Map(Map::new());
        }
        match &mut self.data {
            CollectionData::Map(map) => Ok(map),
            _ => Err(wrong_mode(self.collection, operation, CollectionMode::List)),
        }
    }
}

/// Merges `patch` into `records[index]`, keeping its id.
fn merge_record(records: &mut [Record], index: usize, patch: Value) -> CoreResult<Value> {
    if !patch.is_object() {
        return Err(CoreError::invalid_record(format!(
            "a record patch must be an object, found {}",
            type_name(&patch)
        )));
    }

    let id = records[index].id();
    let mut merged = records[index].as_value().clone();
    merge(&mut merged, patch);
    let merged = Record::try_from(merged)?;
    if merged.id() != id {
        return Err(CoreError::invalid_record("the id of a stored record cannot change"));
    }

    let value = merged.as_value().clone();
    records[index] = merged;
    Ok(value)
}

/// Runs `f` with the map temporarily wrapped as a JSON object.
///
/// `f` must not replace the root, so only non-root paths are applied here.
fn with_object<R>(map: &mut Map<String, Value>, f: impl FnOnce(&mut Value) -> R) -> R {
    let mut root = Value::Object(std::mem::take(map));
    let result = f(&mut root);
    if let Value::Object(inner) = root {
        *map = inner;
    }
    result
}

fn record_id(collection: &str, key: &Key) -> CoreResult<u64> {
    key.as_id().ok_or_else(|| {
        CoreError::type_mismatch(format!(
            "collection {collection} is a list; address records by id, not {key}"
        ))
    })
}

fn key_path(key: &Key) -> CoreResult<Path> {
    let raw = key.to_path();
    let path = Path::parse(&raw)?;
    if path.is_root() {
        return Err(CoreError::invalid_path(raw, "a key must not be empty"));
    }
    Ok(path)
}

fn wrong_mode(collection: &str, operation: &str, found: CollectionMode) -> CoreError {
    CoreError::type_mismatch(format!(
        "cannot {operation} in collection {collection}: it is a {found} collection"
    ))
}

fn not_an_array(path: &Path, found: &Value) -> CoreError {
    CoreError::type_mismatch(format!(
        "value at {:?} is {}, not an array",
        path.as_str(),
        type_name(found)
    ))
}
