//! JSON path utilities.

/// Extract a value from nested JSON using dot-notation path.
///
/// Missing keys, out-of-range indices and type mismatches all resolve
/// to `Value::Null`.
pub fn extract_path<'a>(data: &'a serde_json::Value, path: &str) -> &'a serde_json::Value {
    if path.is_empty() {
        return data;
    }

    let mut current = data;
    for key in path.split('.') {
        current = match current {
            serde_json::Value::Object(map) => map.get(key).unwrap_or(&serde_json::Value::Null),
            serde_json::Value::Array(arr) => match key.parse::<usize>() {
                Ok(idx) => arr.get(idx).unwrap_or(&serde_json::Value::Null),
                Err(_) => &serde_json::Value::Null,
            },
            _ => &serde_json::Value::Null,
        };
    }

    current
}
