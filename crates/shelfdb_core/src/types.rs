//! Core type definitions for ShelfDB.

use serde_json::Value;
use std::fmt;

/// Address of an element inside a collection.
///
/// List collections are addressed by record id, map collections by key.
/// A map key may be a dotted path (`"settings.volume"`) reaching into the
/// stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A record id in a list collection.
    Id(u64),
    /// A key (or dotted path) in a map collection.
    Name(String),
}

impl Key {
    /// Returns the id, if this is an id key.
    #[must_use]
    pub const fn as_id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }

    /// Returns the key as a map path.
    ///
    /// Ids are rendered in decimal, so `Key::Id(7)` addresses map key `"7"`.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }

    /// Converts the key to a JSON value (number or string).
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Id(id) => Value::from(*id),
            Self::Name(name) => Value::from(name.as_str()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

// `u64` is the only integer conversion so that literal ids infer it.
impl From<u64> for Key {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

/// The shape of a collection's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionMode {
    /// Ordered list of records with unique ids.
    List,
    /// Flat mapping from string keys to arbitrary values.
    Map,
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Map => f.write_str("map"),
        }
    }
}
