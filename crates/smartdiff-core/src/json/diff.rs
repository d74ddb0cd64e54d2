use serde_json::{Map, Number, Value};

use crate::types::ChangeRecord;

/// Structural diff of two JSON values.
///
/// Object keys extend the path with `.key`, array indices with `[i]`; the
/// root path is empty and reported as `"root"`. Arrays of different length
/// are reported as a single `modified` record for the whole array.
pub fn diff_json(a: &Value, b: &Value) -> Vec<ChangeRecord> {
    diff_at("", a, b)
}

/// Diff two subtrees that live at `path`.
pub fn diff_at(path: &str, a: &Value, b: &Value) -> Vec<ChangeRecord> {
    if values_equal(a, b) {
        return Vec::new();
    }

    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => vec![modified(path, a, b)],
        (Value::Array(items_a), Value::Array(items_b)) => diff_arrays(path, items_a, items_b),
        (Value::Object(map_a), Value::Object(map_b)) => diff_objects(path, map_a, map_b),
        // Different kinds or unequal scalars replace the whole subtree.
        _ => vec![modified(path, a, b)],
    }
}

fn diff_arrays(path: &str, items_a: &[Value], items_b: &[Value]) -> Vec<ChangeRecord> {
    if items_a.len() != items_b.len() {
        return vec![ChangeRecord::modified(
            display_path(path),
            Value::Array(items_a.to_vec()),
            Value::Array(items_b.to_vec()),
        )];
    }

    items_a
        .iter()
        .zip(items_b)
        .enumerate()
        .flat_map(|(i, (x, y))| diff_at(&index_path(path, i), x, y))
        .collect()
}

fn diff_objects(path: &str, map_a: &Map<String, Value>, map_b: &Map<String, Value>) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for (key, value_a) in map_a {
        let child = key_path(path, key);
        match map_b.get(key) {
            Some(value_b) => changes.extend(diff_at(&child, value_a, value_b)),
            None => changes.push(ChangeRecord::removed(child, value_a.clone())),
        }
    }

    for (key, value_b) in map_b {
        if !map_a.contains_key(key) {
            changes.push(ChangeRecord::added(key_path(path, key), value_b.clone()));
        }
    }

    changes
}

fn modified(path: &str, a: &Value, b: &Value) -> ChangeRecord {
    ChangeRecord::modified(display_path(path), a.clone(), b.clone())
}

/// Deep equality where numbers compare by value, so `1 == 1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x == y;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Leaves plus empty containers.
pub fn count_units(value: &Value) -> usize {
    match value {
        Value::Array(items) if !items.is_empty() => items.iter().map(count_units).sum(),
        Value::Object(map) if !map.is_empty() => map.values().map(count_units).sum(),
        _ => 1,
    }
}

pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        path.to_string()
    }
}

fn key_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}
