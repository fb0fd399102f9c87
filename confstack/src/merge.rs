//! Deep merge of configuration records.

use serde_json::{Map, Value};

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// Behaviour:
/// - Objects are merged recursively; keys are added or overwritten and nested
///   objects are overlaid. A non-object target becomes `{}` first.
/// - Arrays and scalars replace `target` wholesale (no deep merge for arrays).
/// - `null` in `layer` never erases an existing value.
///
/// # Examples
///
/// ```rust
/// use confstack::merge_value;
/// use serde_json::json;
///
/// let mut acc = json!({"a": 1, "b": {"x": 1}});
/// merge_value(&mut acc, json!({"b": {"y": 2}, "c": 3}));
/// assert_eq!(acc, json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3}));
///
/// // Arrays replace existing values.
/// merge_value(&mut acc, json!({"b": [1, 2, 3]}));
/// assert_eq!(acc["b"], json!([1, 2, 3]));
///
/// // Nulls leave the existing value alone.
/// merge_value(&mut acc, json!({"a": null}));
/// assert_eq!(acc["a"], json!(1));
/// ```
pub fn merge_value(target: &mut Value, layer: Value) {
    match layer {
        Value::Object(map) => merge_object(target, map),
        Value::Null => {}
        other => *target = other,
    }
}

fn merge_object(target: &mut Value, map: Map<String, Value>) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(existing) = target.as_object_mut() else {
        return;
    };
    for (key, value) in map {
        match existing.get_mut(&key) {
            Some(slot) => merge_value(slot, value),
            None if value.is_null() => {
                existing.insert(key, Value::Null);
            }
            None => {
                let mut slot = Value::Null;
                merge_value(&mut slot, value);
                existing.insert(key, slot);
            }
        }
    }
}
