use serde_json::{Map, Value};

/// One leaf that differs between two JSON documents.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Change {
    pub path: String,
    pub old: Value,
    pub new: Value,
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Collect leaf changes from `previous` to `current`. Removed leaves are
/// reported with a `null` new value; arrays are compared index by index.
pub(crate) fn diff_json(previous: &Value, current: &Value, prefix: &str, changes: &mut Vec<Change>) {
    match (previous, current) {
        (Value::Object(prev), Value::Object(curr)) => {
            let empty = Value::Object(Map::new());
            for (key, curr_val) in curr {
                let path = child_path(prefix, key);
                match prev.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None if curr_val.is_object() => diff_json(&empty, curr_val, &path, changes),
                    None => changes.push(Change {
                        path,
                        old: Value::Null,
                        new: curr_val.clone(),
                    }),
                }
            }
            for (key, prev_val) in prev {
                if !curr.contains_key(key) {
                    changes.push(Change {
                        path: child_path(prefix, key),
                        old: prev_val.clone(),
                        new: Value::Null,
                    });
                }
            }
        }
        (Value::Array(prev), Value::Array(curr)) => {
            for i in 0..prev.len().max(curr.len()) {
                let path = format!("{prefix}[{i}]");
                match (prev.get(i), curr.get(i)) {
                    (Some(p), Some(c)) => diff_json(p, c, &path, changes),
                    (p, c) => changes.push(Change {
                        path,
                        old: p.cloned().unwrap_or(Value::Null),
                        new: c.cloned().unwrap_or(Value::Null),
                    }),
                }
            }
        }
        (prev, curr) if prev != curr => changes.push(Change {
            path: prefix.to_string(),
            old: prev.clone(),
            new: curr.clone(),
        }),
        _ => {}
    }
}
