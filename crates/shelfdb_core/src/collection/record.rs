//! List-mode records.

use crate::error::{CoreError, CoreResult};
use crate::value::type_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the store-managed id field.
pub const ID_FIELD: &str = "id";

/// One element of a list-mode collection.
///
/// A record is a JSON object with an arbitrary set of fields. The only
/// field the store manages is `id`: a positive integer, unique within the
/// collection. An `id` that is absent, `null` or `0` means "not assigned
/// yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Record(Value);

impl Record {
    /// Creates a record from its fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if the `id` field is present but is not a
    /// non-negative integer or `null`.
    pub fn new(fields: Map<String, Value>) -> CoreResult<Self> {
        match fields.get(ID_FIELD) {
            None | Some(Value::Null) => {}
            Some(id) if id.as_u64().is_some() => {}
            Some(other) => {
                return Err(CoreError::invalid_record(format!(
                    "id must be a non-negative integer, found {}",
                    type_name(other)
                )))
            }
        }
        Ok(Self(Value::Object(fields)))
    }

    /// Returns the assigned id, if any.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_u64)
            .filter(|id| *id != 0)
    }

    /// Sets the id field.
    pub fn set_id(&mut self, id: u64) {
        if let Value::Object(fields) = &mut self.0 {
            fields.insert(ID_FIELD.to_string(), Value::from(id));
        }
    }

    /// Returns a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the record as a JSON object value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Converts the record into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl TryFrom<Value> for Record {
    type Error = CoreError;

    fn try_from(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Self::new(fields),
            other => Err(CoreError::invalid_record(format!(
                "a record must be an object, found {}",
                type_name(&other)
            ))),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl PartialEq<Value> for Record {
    fn eq(&self, other: &Value) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_is_optional() {
        let record = Record::try_from(json!({"name": "Ash"})).unwrap();
        assert_eq!(record.id(), None);

        let zero = Record::try_from(json!({"id": 0, "name": "Ash"})).unwrap();
        assert_eq!(zero.id(), None);

        let null = Record::try_from(json!({"id": null})).unwrap();
        assert_eq!(null.id(), None);
    }

    #[test]
    fn id_must_be_integer() {
        assert!(Record::try_from(json!({"id": "7"})).is_err());
        assert!(Record::try_from(json!({"id": -1})).is_err());
        assert!(Record::try_from(json!({"id": 1.5})).is_err());
    }

    #[test]
    fn records_must_be_objects() {
        let err = Record::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { .. }));
    }

    #[test]
    fn set_id_and_compare() {
        let mut record = Record::try_from(json!({"name": "Misty"})).unwrap();
        record.set_id(2);
        assert_eq!(record.id(), Some(2));
        assert_eq!(record, json!({"id": 2, "name": "Misty"}));
    }

    #[test]
    fn serde_round_trip() {
        let record: Record = serde_json::from_value(json!({"id": 3, "name": "Brock"})).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"id": 3, "name": "Brock"}));
        assert!(serde_json::from_value::<Record>(json!("nope")).is_err());
    }
}
