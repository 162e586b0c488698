//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random collections, records and
//! operation sequences.

use proptest::prelude::*;
use shelfdb_core::{Map, Value, ID_FIELD};

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_-]{0,31}").expect("Invalid regex")
}

/// Strategy for generating map keys that are safe to use in dotted paths.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating dotted paths of one to four keys.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(key_strategy(), 1..5).prop_map(|keys| keys.join("."))
}

/// Strategy for generating arbitrary JSON values.
///
/// Floats are left out so that values compare equal after a CBOR round
/// trip.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for generating list records without an id.
pub fn record_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key_strategy(), json_value_strategy(), 0..6).prop_map(|fields| {
        let mut object: Map<String, Value> = fields.into_iter().collect();
        object.remove(ID_FIELD);
        Value::Object(object)
    })
}

/// A write against a list collection.
#[derive(Debug, Clone)]
pub enum WriteOperation {
    /// Insert a record
    Insert {
        /// Record body
        record: Value,
    },
    /// Merge a patch into a record
    Update {
        /// Target id
        id: u64,
        /// Patch object
        patch: Value,
    },
    /// Remove a record
    Remove {
        /// Target id
        id: u64,
    },
}

/// Strategy for generating write operations over ids `1..=max_id`.
pub fn write_operation_strategy(max_id: u64) -> impl Strategy<Value = WriteOperation> {
    prop_oneof![
        3 => record_strategy().prop_map(|record| WriteOperation::Insert { record }),
        2 => (1..=max_id, record_strategy())
            .prop_map(|(id, patch)| WriteOperation::Update { id, patch }),
        1 => (1..=max_id).prop_map(|id| WriteOperation::Remove { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<WriteOperation>> {
    prop::collection::vec(write_operation_strategy(max_ops as u64), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
