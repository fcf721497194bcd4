//! Dot-path lookup over JSON records
//!
//! Paths are dot-joined object keys (`address.city`). Arrays carry no path
//! segment: crossing an array applies the rest of the path to every element
//! and flattens the results, which mirrors how the index builder names
//! fields inside arrays (`items.sku`).

use std::borrow::Cow;

use serde_json::Value;

/// Resolves `path` against `value`.
///
/// Returns `None` when nothing lives at the path. A path that crosses an
/// array yields an owned array of every match; a path that ends on a value
/// borrows it.
pub fn get_nested_value<'a>(value: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let segments: Vec<&str> = path.split('.').collect();
    lookup(value, &segments)
}

fn lookup<'a>(value: &'a Value, segments: &[&str]) -> Option<Cow<'a, Value>> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(Cow::Borrowed(value));
    };

    match value {
        Value::Object(map) => map.get(*head).and_then(|child| lookup(child, rest)),
        Value::Array(items) => {
            let mut matches = Vec::new();
            for item in items {
                match lookup(item, segments) {
                    Some(Cow::Owned(Value::Array(found))) => matches.extend(found),
                    Some(found) => matches.push(found.into_owned()),
                    None => {}
                }
            }
            if matches.is_empty() {
                None
            } else {
                Some(Cow::Owned(Value::Array(matches)))
            }
        }
        _ => None,
    }
}

/// Collects the non-array leaves of a value, flattening nested arrays.
///
/// A scalar yields itself; an array yields every element at any depth that
/// is not itself an array. Objects are returned as leaves and left to the
/// caller to reject.
pub fn scalar_leaves(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_leaves(value, &mut out);
    out
}

fn collect_leaves<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        other => out.push(other),
    }
}
