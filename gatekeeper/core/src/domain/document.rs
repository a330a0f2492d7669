// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Nested field lookup and assignment on JSON documents.
//!
//! Segments address object keys; a segment that parses as an unsigned
//! integer addresses an array element. Used for request bodies, token
//! claims and decision-service responses alike.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Cannot assign to an empty path")]
    EmptyPath,

    #[error("Cannot index an array with '{0}'")]
    NotAnIndex(String),
}

/// Resolve `path` against `doc`. Returns `None` when any segment is missing.
pub fn lookup<'a, S: AsRef<str>>(doc: &'a Value, path: &[S]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |current, segment| {
        let segment = segment.as_ref();
        match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Resolve a dotted path such as `result.id`. An empty string addresses
/// the document itself.
pub fn lookup_dotted<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }
    let segments: Vec<&str> = path.split('.').collect();
    lookup(doc, &segments)
}

/// Set the field at `path` to `value`, creating intermediate objects as
/// needed. Scalars standing in the way are replaced by objects; arrays are
/// padded with `null` up to a numeric index.
pub fn assign<S: AsRef<str>>(doc: &mut Value, path: &[S], value: Value) -> Result<(), DocumentError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(DocumentError::EmptyPath);
    };

    let mut current = doc;
    for segment in parents {
        current = child_mut(current, segment.as_ref())?;
    }
    *child_mut(current, last.as_ref())? = value;
    Ok(())
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Result<&'a mut Value, DocumentError> {
    match node {
        Value::Array(items) => {
            let index: usize = segment
                .parse()
                .map_err(|_| DocumentError::NotAnIndex(segment.to_string()))?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        other => {
            *other = Value::Object(Map::new());
            child_mut(other, segment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_objects_and_arrays() {
        let doc = json!({"name": {"first": "Janet"}, "tags": ["a", "b"], "age": 47});

        assert_eq!(lookup(&doc, &["name", "first"]), Some(&json!("Janet")));
        assert_eq!(lookup(&doc, &["tags", "1"]), Some(&json!("b")));
        assert_eq!(lookup(&doc, &["age"]), Some(&json!(47)));
        assert_eq!(lookup(&doc, &["name", "last"]), None);
        assert_eq!(lookup(&doc, &["age", "value"]), None);
        assert_eq!(lookup(&doc, &["tags", "x"]), None);
    }

    #[test]
    fn test_lookup_dotted() {
        let doc = json!({"result": {"id": "partner1"}});
        assert_eq!(lookup_dotted(&doc, "result.id"), Some(&json!("partner1")));
        assert_eq!(lookup_dotted(&doc, ""), Some(&doc));
        assert_eq!(lookup_dotted(&doc, "result.name"), None);
    }

    #[test]
    fn test_assign_creates_intermediate_objects() {
        let mut doc = json!({"key_api": "abc"});
        assign(&mut doc, &["partner", "id"], json!("partner1")).unwrap();
        assert_eq!(doc, json!({"key_api": "abc", "partner": {"id": "partner1"}}));
    }

    #[test]
    fn test_assign_replaces_scalars_and_overwrites() {
        let mut doc = json!({"name": "Janet"});
        assign(&mut doc, &["name", "first"], json!("John")).unwrap();
        assert_eq!(doc, json!({"name": {"first": "John"}}));

        assign(&mut doc, &["name", "first"], json!("Jane")).unwrap();
        assert_eq!(lookup(&doc, &["name", "first"]), Some(&json!("Jane")));
    }

    #[test]
    fn test_assign_into_arrays() {
        let mut doc = json!({"items": [1]});
        assign(&mut doc, &["items", "2"], json!(3)).unwrap();
        assert_eq!(doc, json!({"items": [1, null, 3]}));

        assert_eq!(
            assign(&mut doc, &["items", "last"], json!(4)),
            Err(DocumentError::NotAnIndex("last".to_string()))
        );
    }

    #[test]
    fn test_assign_empty_path() {
        let mut doc = json!({});
        let empty: [&str; 0] = [];
        assert_eq!(assign(&mut doc, &empty, json!(1)), Err(DocumentError::EmptyPath));
    }
}
