//! Path operations on an in-memory JSON tree.
//!
//! Mirrors the database's storage rules: `null` deletes, empty objects do
//! not exist, and a `/`-separated path addresses nested children.

use serde_json::{Map, Value};

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether a change at one path can affect the value at the other.
pub fn overlaps(a: &str, b: &str) -> bool {
    let a = segments(a);
    let b = segments(b);
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Read the value at `path`, treating `null` as absent.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    (!node.is_null()).then_some(node)
}

/// Replace the value at `path`. A `null` value removes it.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let segments = segments(path);
    set_segments(root, &segments, normalize(value));
}

/// Merge each child of `partial` into `path`. Child keys may themselves be
/// paths. Non-object partials are ignored.
pub fn merge(root: &mut Value, path: &str, partial: Value) {
    let Value::Object(children) = partial else {
        return;
    };
    let base = segments(path).join("/");
    for (key, value) in children {
        set(root, &format!("{}/{}", base, key), value);
    }
}

fn set_segments(node: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let mut now_empty = false;
    if let Value::Object(map) = node {
        let child_removed = {
            let child = map.entry(head.to_string()).or_insert(Value::Null);
            set_segments(child, rest, value);
            child.is_null()
        };
        if child_removed {
            map.remove(*head);
        }
        now_empty = map.is_empty();
    }
    if now_empty {
        *node = Value::Null;
    }
}

/// Drop `null` children and empty objects, recursively.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        other => other,
    }
}
