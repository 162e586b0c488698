//! Serialization formats for collection snapshots.

use crate::error::{CodecError, CodecResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// On-disk serialization format of collection files.
///
/// Both formats store the same logical [`Value`]: `null` for the empty
/// sentinel, an array for list collections, an object for map collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// UTF-8 JSON, `.json` files. Human editable.
    #[default]
    Json,
    /// CBOR (RFC 8949), `.cbor` files. Smaller and faster to parse.
    Cbor,
}

impl Format {
    /// Returns the conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Cbor => "cbor",
        }
    }

    /// Encodes a value.
    ///
    /// `pretty` only affects JSON, which is then indented with two spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn encode(self, value: &Value, pretty: bool) -> CodecResult<Vec<u8>> {
        match self {
            Self::Json => {
                let result = if pretty {
                    serde_json::to_vec_pretty(value)
                } else {
                    serde_json::to_vec(value)
                };
                result.map_err(|e| CodecError::encoding_failed(self, e.to_string()))
            }
            Self::Cbor => {
                let mut buffer = Vec::new();
                ciborium::ser::into_writer(value, &mut buffer)
                    .map_err(|e| CodecError::encoding_failed(self, e.to_string()))?;
                Ok(buffer)
            }
        }
    }

    /// Decodes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid document in this format.
    pub fn decode(self, bytes: &[u8]) -> CodecResult<Value> {
        match self {
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| CodecError::decoding_failed(self, e.to_string())),
            Self::Cbor => ciborium::de::from_reader(bytes)
                .map_err(|e| CodecError::decoding_failed(self, e.to_string())),
        }
    }

    /// Returns the encoded empty sentinel (`null`).
    #[must_use]
    pub fn sentinel(self) -> Vec<u8> {
        match self {
            Self::Json => b"null".to_vec(),
            Self::Cbor => vec![0xf6],
        }
    }

    /// Returns true if `bytes` holds the empty sentinel, or nothing at all.
    ///
    /// Surrounding whitespace is ignored for JSON.
    #[must_use]
    pub fn is_sentinel(self, bytes: &[u8]) -> bool {
        match self {
            Self::Json => {
                let trimmed = bytes.trim_ascii();
                trimmed.is_empty() || trimmed == b"null"
            }
            Self::Cbor => bytes.is_empty() || bytes == [0xf6],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Cbor => f.write_str("CBOR"),
        }
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "cbor" => Ok(Self::Cbor),
            _ => Err(CodecError::UnknownFormat {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn extensions() {
        assert_eq!(Format::Json.extension(), "json");
        assert_eq!(Format::Cbor.extension(), "cbor");
        assert_eq!(Format::default(), Format::Json);
    }

    #[test]
    fn json_pretty_uses_two_spaces() {
        let bytes = Format::Json.encode(&json!({"volume": 5}), true).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"volume\": 5\n}");
    }

    #[test]
    fn json_compact() {
        let bytes = Format::Json.encode(&json!([{"id": 1}]), false).unwrap();
        assert_eq!(bytes, b"[{\"id\":1}]");
    }

    #[test]
    fn cbor_sentinel_is_null() {
        let bytes = Format::Cbor.encode(&Value::Null, false).unwrap();
        assert_eq!(bytes, Format::Cbor.sentinel());
        assert!(Format::Cbor.is_sentinel(&bytes));
    }

    #[test]
    fn json_sentinel_detection() {
        assert!(Format::Json.is_sentinel(b""));
        assert!(Format::Json.is_sentinel(b"null"));
        assert!(Format::Json.is_sentinel(b"  null\n"));
        assert!(!Format::Json.is_sentinel(b"[]"));
        assert!(!Format::Json.is_sentinel(b"{}"));
    }

    #[test]
    fn cbor_preserves_nested_documents() {
        let value = json!({
            "players": [{"id": 1, "name": "Ash", "badges": ["boulder", "cascade"]}],
            "volume": 0.5,
            "muted": false,
            "owner": null
        });
        let bytes = Format::Cbor.encode(&value, false).unwrap();
        assert_eq!(Format::Cbor.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn json_decode_error_is_reported() {
        let err = Format::Json.decode(b"{not json").unwrap_err();
        assert!(matches!(
            err,
            CodecError::DecodingFailed {
                format: Format::Json,
                ..
            }
        ));
    }

    #[test]
    fn cbor_decode_error_is_reported() {
        let err = Format::Cbor.decode(&[0xff, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::DecodingFailed {
                format: Format::Cbor,
                ..
            }
        ));
    }

    #[test]
    fn parse_format_names() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("CBOR".parse::<Format>().unwrap(), Format::Cbor);
        assert!("yaml".parse::<Format>().is_err());
    }

    fn arb_document() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<u64>().prop_map(Value::from),
            ".{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(".{0,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn documents_survive_both_formats(value in arb_document(), pretty in any::<bool>()) {
            for format in [Format::Json, Format::Cbor] {
                let bytes = format.encode(&value, pretty).unwrap();
                prop_assert_eq!(format.decode(&bytes).unwrap(), value.clone());
            }
        }
    }
}
