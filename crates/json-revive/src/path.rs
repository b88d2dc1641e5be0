//! Dotted-path utilities for duplicate-reference markers.
//!
//! Paths are `$`-rooted and join object keys and array indices with `.`
//! (`$.users.0.name`). A key that itself contains `.` cannot be addressed,
//! a limitation inherited from the wire format.

use crate::error::DecodeError;
use crate::value::Value;

/// The root marker.
pub const ROOT: &str = "$";

/// Join path keys into a dotted path string.
pub fn format_path(keys: &[String]) -> String {
    keys.join(".")
}

/// Resolve a dotted path against the finished root.
///
/// `$` resolves to the root itself; `$.a.0` descends object keys and array
/// indices. Any miss (including a path that does not start at the root
/// marker or routes through a non-container) is a
/// [`DecodeError::UnresolvedReference`] naming the full path.
pub fn resolve_path(root: &Value, path: &str) -> Result<Value, DecodeError> {
    if path == ROOT {
        return Ok(root.clone());
    }
    let unresolved = || DecodeError::UnresolvedReference(path.to_string());
    let rest = path.strip_prefix("$.").ok_or_else(unresolved)?;
    let mut current = root.clone();
    for segment in rest.split('.') {
        let next = match &current {
            Value::Object(data) => data.borrow().entries.get(segment).cloned(),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.borrow().get(index).cloned()),
            _ => None,
        };
        current = next.ok_or_else(unresolved)?;
    }
    Ok(current)
}

/// Write `value` into `container` at `key` (object key or array index).
///
/// `path` is the source path of the reference being patched, used only to
/// label the error when the target slot does not exist.
pub(crate) fn assign(
    container: &Value,
    key: &str,
    value: Value,
    path: &str,
) -> Result<(), DecodeError> {
    let unresolved = || DecodeError::UnresolvedReference(path.to_string());
    match container {
        Value::Object(data) => {
            data.borrow_mut().entries.insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = key.parse::<usize>().map_err(|_| unresolved())?;
            let mut items = items.borrow_mut();
            let slot = items.get_mut(index).ok_or_else(unresolved)?;
            *slot = value;
            Ok(())
        }
        _ => Err(unresolved()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let root = Value::object();
        let list = Value::array();
        list.push(Value::from("zero"));
        list.push(Value::from(1.5));
        root.insert("list", list);
        let inner = Value::object();
        inner.insert("deep", Value::from(true));
        root.insert("inner", inner);
        root
    }

    #[test]
    fn resolves_root_marker() {
        let root = sample();
        assert!(resolve_path(&root, "$").unwrap().same_identity(&root));
    }

    #[test]
    fn resolves_keys_and_indices() {
        let root = sample();
        assert_eq!(resolve_path(&root, "$.list.0").unwrap(), Value::from("zero"));
        assert_eq!(
            resolve_path(&root, "$.inner.deep").unwrap(),
            Value::from(true)
        );
    }

    #[test]
    fn misses_are_loud() {
        let root = sample();
        for path in ["$.nope", "$.list.9", "$.list.x", "$.inner.deep.more", "list.0", ""] {
            let err = resolve_path(&root, path).unwrap_err();
            assert!(
                matches!(err, DecodeError::UnresolvedReference(p) if p == path),
                "expected unresolved `{path}`"
            );
        }
    }

    #[test]
    fn format_joins_with_dots() {
        let keys = vec!["$".to_string(), "a".to_string(), "0".to_string()];
        assert_eq!(format_path(&keys), "$.a.0");
        assert_eq!(format_path(&keys[..1]), "$");
    }

    #[test]
    fn assign_overwrites_array_slot() {
        let root = sample();
        let list = root.get("list").unwrap();
        assign(&list, "1", Value::from("patched"), "$.x").unwrap();
        assert_eq!(list.at(1).unwrap(), Value::from("patched"));
    }
}
