//! Path access and zero-value checks on merge records.

use std::num::FpCategory;

use serde_json::{Map, Number, Value};

use crate::schema::{Kind, ValueType};

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => index(segment).and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Value at `path`, indexing arrays by numeric segments.
pub(crate) fn get<'a, S: AsRef<str>>(root: &'a Value, path: &[S]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |node, segment| child(node, segment.as_ref()))
}

/// Mutable value at `path`.
pub(crate) fn get_mut<'a, S: AsRef<str>>(root: &'a mut Value, path: &[S]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |node, segment| child_mut(node, segment.as_ref()))
}

/// Store `value` at `path`, creating intermediate objects.
///
/// Scalars and `null` found along the way are replaced by objects. Array
/// segments must address an existing element; returns `false` otherwise.
pub(crate) fn set<S: AsRef<str>>(root: &mut Value, path: &[S], value: Value) -> bool {
    try_set(root, path, value).is_some()
}

fn try_set<S: AsRef<str>>(root: &mut Value, path: &[S], value: Value) -> Option<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Some(());
    };
    let mut node = root;
    for segment in parents {
        node = match node {
            Value::Array(items) => items.get_mut(index(segment.as_ref())?)?,
            other => object(other)?
                .entry(segment.as_ref())
                .or_insert_with(|| Value::Object(Map::new())),
        };
    }
    match node {
        Value::Array(items) => *items.get_mut(index(last.as_ref())?)? = value,
        other => {
            object(other)?.insert(last.as_ref().to_owned(), value);
        }
    }
    Some(())
}

fn index(segment: &str) -> Option<usize> {
    segment.parse().ok()
}

fn object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

/// Whether `value` holds its type's zero value.
///
/// Missing values, `null`, `false`, numeric zero, empty strings, empty
/// collections and objects whose members are all zero count as zero.
pub(crate) fn is_zero(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number_is_zero(number),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.values().all(|member| is_zero(Some(member))),
    }
}

fn number_is_zero(number: &Number) -> bool {
    if let Some(int) = number.as_i64() {
        return int == 0;
    }
    if let Some(uint) = number.as_u64() {
        return uint == 0;
    }
    number
        .as_f64()
        .is_some_and(|float| float.classify() == FpCategory::Zero)
}

/// Zero value written for fields missing from the record.
///
/// Timestamps have no zero and yield `None`.
pub(crate) fn zero_value(ty: ValueType) -> Option<Value> {
    if ty.is_optional() {
        return Some(Value::Null);
    }
    let value = match ty.kind() {
        Kind::String => Value::String(String::new()),
        Kind::Int | Kind::Uint => Value::from(0_u8),
        Kind::Float => Value::from(0.0_f64),
        Kind::Bool => Value::Bool(false),
        Kind::Duration => serde_json::json!({ "secs": 0, "nanos": 0 }),
        Kind::Time => return None,
        Kind::Struct | Kind::Map => Value::Object(Map::new()),
        Kind::Slice => Value::Array(Vec::new()),
    };
    Some(value)
}
