use serde_json::Value;

/// Flatten the many shapes of a prediction `output` field into result URLs.
///
/// Accepted shapes: a single string, an array of strings, or an object with
/// either an `images` array or an `image` string. Non-string and empty
/// entries are dropped; anything else yields an empty list.
pub fn normalize_output(output: &Value) -> Vec<String> {
    match output {
        Value::String(url) if !url.is_empty() => vec![url.clone()],
        Value::Array(items) => string_items(items),
        Value::Object(map) => match (map.get("images"), map.get("image")) {
            (Some(Value::Array(items)), _) => string_items(items),
            (_, Some(Value::String(url))) if !url.is_empty() => vec![url.clone()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
