//! The collection handle.

use super::data::CollectionData;
use super::ops::{Editor, UpsertTarget};
use super::query::Query;
use super::record::Record;
use super::typed::TypedCollection;
use crate::error::CoreResult;
use crate::lock::{LockManager, Pending};
use crate::snapshot::SnapshotStore;
use crate::types::{CollectionMode, Key};
use crate::value::Path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A named collection.
///
/// Handles are cheap to clone and are obtained from
/// [`Database::collection`](crate::Database::collection).
///
/// # Writes
///
/// Every mutating method loads the collection, applies its change in
/// memory and saves the whole value, all within one exclusive turn for
/// this collection. Calls are applied in the order they are made, even
/// when issued concurrently, and the returned [`Pending`] yields the
/// result. The operation runs whether or not the `Pending` is awaited.
///
/// Mutating methods must be called from within a Tokio runtime.
///
/// # Reads
///
/// Reads take no turn. They see the value as of the last completed save,
/// never a partially written one.
///
/// # Example
///
/// ```rust,ignore
/// let players = db.collection("players")?;
/// let ash = players.insert(json!({"name": "Ash"})).await?;
/// assert_eq!(ash.id(), Some(1));
///
/// players.update(1, json!({"badges": 8})).await?;
/// let found = players.find_one(Query::matching(json!({"badges": 8}))).await?;
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    store: SnapshotStore,
    locks: Arc<LockManager>,
    /// Largest id this handle has assigned. Keeps removed ids from being
    /// reissued while the process runs; not persisted across reopen.
    high_water: AtomicU64,
}

impl Inner {
    fn load(&self) -> CoreResult<CollectionData> {
        self.store.load(&self.name)
    }

    /// Load, edit, save. Runs inside the collection's turn.
    fn apply<T>(&self, edit: impl FnOnce(&mut Editor<'_>) -> CoreResult<T>) -> CoreResult<T> {
        let data = self.load()?;
        let mut editor = Editor::new(&self.name, data, self.high_water.load(Ordering::Acquire));
        let result = edit(&mut editor)?;
        if editor.changed() {
            let (data, high_water) = editor.finish();
            self.store.save(&self.name, &data)?;
            self.high_water.store(high_water, Ordering::Release);
        }
        Ok(result)
    }
}

impl Collection {
    pub(crate) fn new(name: String, store: SnapshotStore, locks: Arc<LockManager>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                store,
                locks,
                high_water: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns a typed view of this collection.
    #[must_use]
    pub fn typed<T>(&self) -> TypedCollection<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        TypedCollection::new(self.clone())
    }

    pub(crate) fn reset_ids(&self) {
        self.inner.high_water.store(0, Ordering::Release);
    }

    fn mutate<T, F>(&self, edit: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Editor<'_>) -> CoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.inner
            .locks
            .run_exclusive(&self.inner.name, move || inner.apply(edit))
    }

    async fn read<T, F>(&self, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(CollectionData) -> CoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.load().and_then(f)).await?
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Returns the whole collection value.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn data(&self) -> CoreResult<CollectionData> {
        self.read(Ok).await
    }

    /// Returns the whole collection value without a runtime.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub fn data_blocking(&self) -> CoreResult<CollectionData> {
        self.inner.load()
    }

    /// List mode: the array of records matching `query`. Map mode: the
    /// whole map. A collection never written returns `[]`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn get(&self, query: impl Into<Query>) -> CoreResult<Value> {
        let query = query.into();
        self.read(move |data| Ok(data.select(&query))).await
    }

    /// Blocking form of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub fn get_blocking(&self, query: impl Into<Query>) -> CoreResult<Value> {
        Ok(self.inner.load()?.select(&query.into()))
    }

    /// Returns the first record matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn find_one(&self, query: impl Into<Query>) -> CoreResult<Option<Record>> {
        let query = query.into();
        self.read(move |data| Ok(data.find(&query).cloned())).await
    }

    /// Returns the record with this id.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn find_by_id(&self, id: u64) -> CoreResult<Option<Record>> {
        self.read(move |data| Ok(data.record(id).cloned())).await
    }

    /// List mode: whether any record matches `query`. Map mode: whether
    /// the map has any entry.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn exists(&self, query: impl Into<Query>) -> CoreResult<bool> {
        let query = query.into();
        self.read(move |data| Ok(data.any(&query))).await
    }

    /// Whether an element exists at `key` (a record id, or a map key or
    /// dotted path).
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for a name key on a list, `InvalidPath`,
    /// `CorruptData` or a storage error.
    pub async fn has(&self, key: impl Into<Key>) -> CoreResult<bool> {
        let key = key.into();
        self.read(move |data| data.contains(&key)).await
    }

    /// Number of records matching `query` (list mode) or entries (map
    /// mode).
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn count(&self, query: impl Into<Query>) -> CoreResult<usize> {
        let query = query.into();
        self.read(move |data| Ok(data.count(&query))).await
    }

    /// Record ids or map keys.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn keys(&self) -> CoreResult<Vec<Key>> {
        self.read(|data| Ok(data.keys())).await
    }

    /// Records or map values.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` or a storage error.
    pub async fn values(&self) -> CoreResult<Vec<Value>> {
        self.read(|data| Ok(data.values())).await
    }

    /// The first record of a list collection.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on a map, `CorruptData` or a storage error.
    pub async fn first(&self) -> CoreResult<Option<Record>> {
        self.read(|data| Ok(data.first()?.cloned())).await
    }

    /// The last record of a list collection.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on a map, `CorruptData` or a storage error.
    pub async fn last(&self) -> CoreResult<Option<Record>> {
        self.read(|data| Ok(data.last()?.cloned())).await
    }

    /// The value at a deep path, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath`, `CorruptData` or a storage error.
    pub async fn get_in(&self, path: &str, default: Value) -> CoreResult<Value> {
        let path = Path::parse(path)?;
        self.read(move |data| Ok(data.lookup(&path).unwrap_or(default)))
            .await
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Appends a record to a list collection.
    ///
    /// A record without an id (absent, `null` or `0`) gets one greater than
    /// any id present or previously assigned. Resolves to the stored
    /// record.
    ///
    /// Assigned ids are remembered only in memory. Within one process a
    /// removed id is never handed out again, but after the database is
    /// reopened numbering resumes from the largest stored id, so a removed
    /// top id can come back.
    ///
    /// Fails with `InvalidRecord` if `record` is not an object or no id is
    /// left above the largest one, `DuplicateId` if its id is taken,
    /// `TypeMismatch` on a map.
    pub fn insert(&self, record: Value) -> Pending<Record> {
        self.mutate(move |ed| ed.insert(record))
    }

    /// Stores `value` under `key` in a map collection. Resolves to the
    /// stored value.
    ///
    /// Fails with `TypeMismatch` on a list.
    pub fn insert_key(&self, key: impl Into<String>, value: Value) -> Pending<Value> {
        let key = key.into();
        self.mutate(move |ed| ed.insert_key(key, value))
    }

    /// Deep-merges `patch` into the element at `key`. Resolves to the
    /// merged value, or `None` if there is no such element.
    ///
    /// List records are addressed by id and `patch` must be an object that
    /// leaves the id unchanged. Map keys may be dotted paths.
    pub fn update(&self, key: impl Into<Key>, patch: Value) -> Pending<Option<Value>> {
        let key = key.into();
        self.mutate(move |ed| ed.update(&key, patch))
    }

    /// Removes the element at `key`. Resolves to false if it was absent.
    pub fn remove(&self, key: impl Into<Key>) -> Pending<bool> {
        let key = key.into();
        self.mutate(move |ed| ed.remove(&key))
    }

    /// Updates the element `target` selects, or inserts `patch` if there is
    /// none. Resolves to the stored value.
    ///
    /// A query target selects by the pattern's `id` when it has one, else
    /// by the first structural match, scanning the whole list.
    pub fn upsert(&self, target: impl Into<UpsertTarget>, patch: Value) -> Pending<Value> {
        let target = target.into();
        self.mutate(move |ed| ed.upsert(&target, patch))
    }

    /// Replaces the value with an empty list or map.
    pub fn clear(&self, mode: CollectionMode) -> Pending<()> {
        self.mutate(move |ed| {
            ed.clear(mode);
            Ok(())
        })
    }

    /// Deletes the collection file. Resolves to false if there was none.
    ///
    /// The next operation on this collection starts from the empty
    /// sentinel again.
    pub fn delete_collection(&self) -> Pending<bool> {
        let inner = Arc::clone(&self.inner);
        self.inner.locks.run_exclusive(&self.inner.name, move || {
            let removed = inner.store.delete(&inner.name)?;
            inner.high_water.store(0, Ordering::Release);
            Ok(removed)
        })
    }

    // ------------------------------------------------------------------
    // Bulk writes: one load, one save, one turn.
    // ------------------------------------------------------------------

    /// Inserts several records. Either all are stored or none.
    pub fn bulk_insert(&self, records: Vec<Value>) -> Pending<Vec<Record>> {
        self.mutate(move |ed| records.into_iter().map(|r| ed.insert(r)).collect())
    }

    /// Stores several keyed values in a map collection.
    pub fn bulk_insert_entries(&self, entries: Vec<(String, Value)>) -> Pending<Vec<Value>> {
        self.mutate(move |ed| {
            entries
                .into_iter()
                .map(|(key, value)| ed.insert_key(key, value))
                .collect()
        })
    }

    /// Applies several updates. Resolves to one result per update.
    pub fn bulk_update(&self, updates: Vec<(Key, Value)>) -> Pending<Vec<Option<Value>>> {
        self.mutate(move |ed| {
            updates
                .into_iter()
                .map(|(key, patch)| ed.update(&key, patch))
                .collect()
        })
    }

    /// Removes several elements. Resolves to one flag per key.
    pub fn bulk_remove(&self, keys: Vec<Key>) -> Pending<Vec<bool>> {
        self.mutate(move |ed| keys.iter().map(|key| ed.remove(key)).collect())
    }

    /// Applies several upserts in order.
    pub fn bulk_upsert(&self, items: Vec<(UpsertTarget, Value)>) -> Pending<Vec<Value>> {
        self.mutate(move |ed| {
            items
                .into_iter()
                .map(|(target, patch)| ed.upsert(&target, patch))
                .collect()
        })
    }

    // ------------------------------------------------------------------
    // Deep-path writes on the whole collection value.
    // ------------------------------------------------------------------

    /// Stores `value` at a deep path, creating containers on the way.
    pub fn set_in(&self, path: &str, value: Value) -> Pending<()> {
        let path = path.to_string();
        self.mutate(move |ed| ed.set_in(&Path::parse(&path)?, value))
    }

    /// Deep-merges `value` into the value at a deep path. Resolves to the
    /// merged value.
    pub fn merge_in(&self, path: &str, value: Value) -> Pending<Value> {
        let path = path.to_string();
        self.mutate(move |ed| ed.merge_in(&Path::parse(&path)?, value))
    }

    /// Appends to the array at a deep path, creating it when absent.
    /// Resolves to the new length.
    ///
    /// Fails with `TypeMismatch` if something other than an array is
    /// there.
    pub fn push_in(&self, path: &str, value: Value) -> Pending<usize> {
        let path = path.to_string();
        self.mutate(move |ed| ed.push_in(&Path::parse(&path)?, value))
    }

    /// Removes the elements matching `query` from the array at a deep
    /// path. Resolves to the removed elements.
    pub fn pull_in(&self, path: &str, query: impl Into<Query>) -> Pending<Vec<Value>> {
        let path = path.to_string();
        let query = query.into();
        self.mutate(move |ed| ed.pull_in(&Path::parse(&path)?, &query))
    }

    /// Removes the value at a deep path. Resolves to false if nothing was
    /// there.
    pub fn delete_in(&self, path: &str) -> Pending<bool> {
        let path = path.to_string();
        self.mutate(move |ed| ed.delete_in(&Path::parse(&path)?))
    }

    /// Replaces the value at a deep path with `f(current)`. Resolves to the
    /// new value.
    pub fn update_in<F>(&self, path: &str, f: F) -> Pending<Value>
    where
        F: FnOnce(Option<Value>) -> Value + Send + 'static,
    {
        let path = path.to_string();
        self.mutate(move |ed| ed.update_in(&Path::parse(&path)?, f))
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("high_water", &self.inner.high_water.load(Ordering::Relaxed))
            .finish()
    }
}
