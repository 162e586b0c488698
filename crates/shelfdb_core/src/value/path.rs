//! Deep paths into JSON values.
//!
//! Paths use the familiar dotted/bracket syntax:
//!
//! ```text
//! settings.volume
//! teams[0].members[2].name
//! badges["gym.leader"]
//! ```
//!
//! The empty path addresses the root value.

use crate::error::{CoreError, CoreResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// An object key. All-digit keys also index arrays.
    Key(String),
    /// An array index written in brackets.
    Index(usize),
}

impl Segment {
    /// Returns the array index this segment denotes, if any.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(k) if !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()) => k.parse().ok(),
            Self::Key(_) => None,
        }
    }

    /// Returns the object key this segment denotes.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::Key(k) => k.clone(),
            Self::Index(i) => i.to_string(),
        }
    }

    /// Creates the empty container this segment indexes into. Only
    /// bracketed indexes create arrays; an all-digit key creates an object.
    fn empty_container(&self) -> Value {
        if matches!(self, Self::Index(_)) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    }
}

/// A parsed deep path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    /// The path addressing the root value.
    #[must_use]
    pub fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    /// Parses a path string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` on empty segments (`a..b`, `.a`, `a.`),
    /// unterminated or malformed brackets, or text directly after `]`.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let err = |message: &str| CoreError::invalid_path(raw, message);

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut after_bracket = false;
        let mut pending_dot = false;
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() {
                        if !after_bracket {
                            return Err(err("empty segment"));
                        }
                    } else {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    after_bracket = false;
                    pending_dot = true;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    let segment = match chars.peek() {
                        Some(&quote @ ('"' | '\'')) => {
                            chars.next();
                            let mut key = String::new();
                            loop {
                                match chars.next() {
                                    Some('\\') => match chars.next() {
                                        Some(escaped) => key.push(escaped),
                                        None => return Err(err("unterminated escape")),
                                    },
                                    Some(q) if q == quote => break,
                                    Some(other) => key.push(other),
                                    None => return Err(err("unterminated quoted key")),
                                }
                            }
                            if chars.next() != Some(']') {
                                return Err(err("expected ']' after quoted key"));
                            }
                            Segment::Key(key)
                        }
                        _ => {
                            let mut digits = String::new();
                            loop {
                                match chars.next() {
                                    Some(']') => break,
                                    Some(d) if d.is_ascii_digit() => digits.push(d),
                                    Some(_) => return Err(err("bracket index must be a number")),
                                    None => return Err(err("unterminated bracket")),
                                }
                            }
                            let index = digits
                                .parse()
                                .map_err(|_| err("bracket index must be a number"))?;
                            Segment::Index(index)
                        }
                    };
                    segments.push(segment);
                    after_bracket = true;
                    pending_dot = false;
                }
                ']' => return Err(err("unexpected ']'")),
                other => {
                    if after_bracket {
                        return Err(err("expected '.' or '[' after ']'"));
                    }
                    current.push(other);
                    pending_dot = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Key(current));
        } else if pending_dot {
            return Err(err("trailing '.'"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Looks up the value at this path.
    #[must_use]
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| step(node, segment))
    }

    /// Looks up the path minus its first segment, starting from `start`.
    ///
    /// Lets callers resolve the first step themselves without building a
    /// root value.
    #[must_use]
    pub fn get_tail<'a>(&self, start: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .skip(1)
            .try_fold(start, |node, segment| step(node, segment))
    }

    /// Looks up the value at this path for mutation.
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| step_mut(node, segment))
    }

    /// Stores `value` at this path, creating missing containers on the way.
    ///
    /// Missing or scalar intermediate values are replaced by an array when
    /// the next segment is a bracketed index, by an object otherwise. An
    /// array index may address an existing element or append one element
    /// at the end, never leave a gap.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if a non-numeric key is applied to an array,
    /// `InvalidPath` if an index lies past the end of an array.
    pub fn set(&self, root: &mut Value, value: Value) -> CoreResult<()> {
        let Some((last, parents)) = self.segments.split_last() else {
            *root = value;
            return Ok(());
        };

        let mut node = root;
        for (i, segment) in parents.iter().enumerate() {
            let next = &self.segments[i + 1];
            node = child_or_insert(node, segment, next, &self.raw)?;
        }

        if !node.is_object() && !node.is_array() {
            *node = last.empty_container();
        }
        *slot(node, last, &self.raw)? = value;
        Ok(())
    }

    /// Removes the value at this path.
    ///
    /// Array elements are removed, shifting later elements down. Returns
    /// false if nothing was there; the root itself is never removed.
    pub fn unset(&self, root: &mut Value) -> bool {
        let Some((last, parents)) = self.segments.split_last() else {
            return false;
        };

        let parent = parents
            .iter()
            .try_fold(root, |node, segment| step_mut(node, segment));

        match parent {
            Some(Value::Object(map)) => map.remove(&last.as_key()).is_some(),
            Some(Value::Array(items)) => match last.as_index() {
                Some(i) if i < items.len() => {
                    items.remove(i);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

fn step<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(&segment.as_key()),
        Value::Array(items) => segment.as_index().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(&segment.as_key()),
        Value::Array(items) => segment.as_index().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Returns the child slot for `segment`, creating it (and converting
/// scalars into containers) as needed so that `next` can be applied.
fn child_or_insert<'a>(
    node: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    raw: &str,
) -> CoreResult<&'a mut Value> {
    if !node.is_object() && !node.is_array() {
        *node = segment.empty_container();
    }
    let child = slot(node, segment, raw)?;
    if !child.is_object() && !child.is_array() {
        *child = next.empty_container();
    }
    Ok(child)
}

/// Returns the slot for `segment` inside a container, creating it.
fn slot<'a>(node: &'a mut Value, segment: &Segment, raw: &str) -> CoreResult<&'a mut Value> {
    match node {
        Value::Object(map) => Ok(map.entry(segment.as_key()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = segment.as_index().ok_or_else(|| {
                CoreError::type_mismatch(format!(
                    "path {raw:?}: key {:?} cannot index an array",
                    segment.as_key()
                ))
            })?;
            match index.cmp(&items.len()) {
                Ordering::Less => {}
                Ordering::Equal => items.push(Value::Null),
                Ordering::Greater => {
                    return Err(CoreError::invalid_path(
                        raw,
                        format!("index {index} is past the end of an array of length {}", items.len()),
                    ))
                }
            }
            Ok(&mut items[index])
        }
        _ => Err(CoreError::type_mismatch(format!(
            "path {raw:?}: cannot descend into a scalar"
        ))),
    }
}

impl FromStr for Path {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(path: &str) -> Vec<Segment> {
        Path::parse(path).unwrap().segments().to_vec()
    }

    #[test]
    fn parse_dotted() {
        assert_eq!(
            keys("a.b.c"),
            vec![
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Key("c".into())
            ]
        );
    }

    #[test]
    fn parse_brackets() {
        assert_eq!(
            keys("teams[0].members[12]"),
            vec![
                Segment::Key("teams".into()),
                Segment::Index(0),
                Segment::Key("members".into()),
                Segment::Index(12)
            ]
        );
        assert_eq!(keys("[3]"), vec![Segment::Index(3)]);
    }

    #[test]
    fn parse_quoted_keys() {
        assert_eq!(
            keys("badges[\"gym.leader\"]['x\\'y']"),
            vec![
                Segment::Key("badges".into()),
                Segment::Key("gym.leader".into()),
                Segment::Key("x'y".into())
            ]
        );
    }

    #[test]
    fn parse_root() {
        assert!(Path::parse("").unwrap().is_root());
        assert!(Path::root().is_root());
    }

    #[test]
    fn parse_errors() {
        for bad in ["a..b", ".a", "a.", "a[", "a[x]", "a]", "a[0]b", "a[\"x", "a[\"x\"b"] {
            assert!(
                matches!(Path::parse(bad), Err(CoreError::InvalidPath { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn get_nested() {
        let value = json!({"teams": [{"name": "red"}, {"name": "blue"}]});
        let path = Path::parse("teams[1].name").unwrap();
        assert_eq!(path.get(&value), Some(&json!("blue")));

        let numeric_key = Path::parse("teams.0.name").unwrap();
        assert_eq!(numeric_key.get(&value), Some(&json!("red")));

        assert_eq!(Path::parse("teams[5]").unwrap().get(&value), None);
        assert_eq!(Path::parse("teams.name").unwrap().get(&value), None);
    }

    #[test]
    fn set_creates_objects_and_arrays() {
        let mut value = json!({});
        Path::parse("a.b").unwrap().set(&mut value, json!(1)).unwrap();
        Path::parse("list[0]").unwrap().set(&mut value, json!("x")).unwrap();
        Path::parse("list[1]").unwrap().set(&mut value, json!("y")).unwrap();
        Path::parse("list[0]").unwrap().set(&mut value, json!("z")).unwrap();
        Path::parse("users.3000000").unwrap().set(&mut value, json!(7)).unwrap();

        assert_eq!(
            value,
            json!({"a": {"b": 1}, "list": ["z", "y"], "users": {"3000000": 7}})
        );
    }

    #[test]
    fn set_past_array_end_fails() {
        let mut value = json!({"list": [1]});
        for raw in ["list[2]", "list[100000000000000]", "list[18446744073709551615]", "list.5"] {
            let err = Path::parse(raw).unwrap().set(&mut value, json!(0)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidPath { .. }), "{raw}: {err}");
        }
        let err = Path::parse("fresh[3]").unwrap().set(&mut value, json!(0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath { .. }));
        assert_eq!(value["list"], json!([1]));

        // An all-digit key still indexes an existing array.
        Path::parse("list.1").unwrap().set(&mut value, json!(2)).unwrap();
        assert_eq!(value["list"], json!([1, 2]));
    }

    #[test]
    fn set_replaces_scalar_parents() {
        let mut value = json!({"a": 5});
        Path::parse("a.b").unwrap().set(&mut value, json!(true)).unwrap();
        assert_eq!(value, json!({"a": {"b": true}}));
    }

    #[test]
    fn set_root_replaces_everything() {
        let mut value = json!({"a": 1});
        Path::root().set(&mut value, json!([1, 2])).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn set_named_key_on_array_fails() {
        let mut value = json!({"list": [1, 2]});
        let err = Path::parse("list.name")
            .unwrap()
            .set(&mut value, json!(1))
            .unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn unset_object_and_array() {
        let mut value = json!({"a": {"b": 1, "c": 2}, "list": [1, 2, 3]});
        assert!(Path::parse("a.b").unwrap().unset(&mut value));
        assert!(Path::parse("list[0]").unwrap().unset(&mut value));
        assert!(!Path::parse("a.zzz").unwrap().unset(&mut value));
        assert!(!Path::parse("missing.deep").unwrap().unset(&mut value));
        assert!(!Path::root().unset(&mut value));
        assert_eq!(value, json!({"a": {"c": 2}, "list": [2, 3]}));
    }
}
