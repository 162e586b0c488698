//! Typed view of a list collection.

use super::handle::Collection;
use crate::error::CoreResult;
use crate::lock::Pending;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shelfdb_codec::{CodecError, Format};
use std::future::Future;
use std::marker::PhantomData;

/// A list collection whose records (de)serialize as `T`.
///
/// Records go through `serde_json`, so `T` sees the `id` field like any
/// other. Give `T` an `Option<u64>` id field (skipped when `None`) to let
/// the store assign ids:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Player {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     id: Option<u64>,
///     name: String,
/// }
///
/// let players = db.collection("players")?.typed::<Player>();
/// let ash = players.insert(&Player { id: None, name: "Ash".into() }).await?;
/// assert_eq!(ash.id, Some(1));
/// ```
///
/// Writes keep the ordering of the underlying [`Collection`]: the turn is
/// taken when the method is called, not when the returned future is
/// first polled.
pub struct TypedCollection<T> {
    collection: Collection,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedCollection<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(collection: Collection) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Returns the untyped collection.
    #[must_use]
    pub fn untyped(&self) -> &Collection {
        &self.collection
    }

    /// Inserts an entity. Resolves to the stored entity, id included.
    pub fn insert(&self, entity: &T) -> impl Future<Output = CoreResult<T>> + Send + 'static {
        let pending = encode(entity).map(|value| self.collection.insert(value));
        async move { decode(pending?.await?.into_value()) }
    }

    /// Deep-merges `patch` into the record with this id. Resolves to the
    /// merged entity, or `None` if there is no such record.
    pub fn update(
        &self,
        id: u64,
        patch: Value,
    ) -> impl Future<Output = CoreResult<Option<T>>> + Send + 'static {
        let pending = self.collection.update(id, patch);
        async move { pending.await?.map(decode).transpose() }
    }

    /// Removes the record with this id.
    pub fn remove(&self, id: u64) -> Pending<bool> {
        self.collection.remove(id)
    }

    /// Returns the record with this id.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the record does not deserialize as `T`,
    /// `CorruptData` or a storage error.
    pub async fn find_by_id(&self, id: u64) -> CoreResult<Option<T>> {
        self.collection
            .find_by_id(id)
            .await?
            .map(|record| decode(record.into_value()))
            .transpose()
    }

    /// Returns every record.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a record does not deserialize as `T`,
    /// `CorruptData` or a storage error.
    pub async fn get_all(&self) -> CoreResult<Vec<T>> {
        self.collection
            .values()
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

impl<T> Clone for TypedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for TypedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCollection")
            .field("collection", &self.collection.name())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

fn encode<S: Serialize>(value: &S) -> CoreResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| CodecError::encoding_failed(Format::Json, e.to_string()).into())
}

fn decode<T: DeserializeOwned>(value: Value) -> CoreResult<T> {
    serde_json::from_value(value)
        .map_err(|e| CodecError::decoding_failed(Format::Json, e.to_string()).into())
}
