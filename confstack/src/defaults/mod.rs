//! Default application and required-field enforcement.

use std::sync::Arc;

use serde_json::Value;

use crate::env::convert::convert;
use crate::schema::{Describe, FieldDescriptor, MAX_DEPTH, Schema};
use crate::{ConfigError, ConfigResult, tree};

/// Give every zero field with a default its converted default, and every
/// missing field its type's zero value.
///
/// Elements of lists of structs and present optional structs are visited
/// with their own schema.
pub(crate) fn apply_defaults(schema: &Schema, record: &mut Value) -> ConfigResult<()> {
    apply_level(schema, record, &[], 0)
}

fn apply_level(
    schema: &Schema,
    record: &mut Value,
    base: &[String],
    depth: usize,
) -> ConfigResult<()> {
    for field in schema {
        let path = join(base, field);
        let current = tree::get(record, &path);
        if tree::is_zero(current) {
            if let Some(literal) = field.default_literal() {
                let value = convert(literal, field.value_type(), &field.key())?;
                tree::set(record, &path, value);
            } else if current.is_none()
                && let Some(zero) = tree::zero_value(field.value_type())
            {
                tree::set(record, &path, zero);
            }
        }
        let shape = record_shape(record, &path);
        visit_nested(field, &path, shape, depth, |describe, nested_base| {
            let nested = Schema::from_describe(describe)?;
            apply_level(&nested, record, nested_base, depth + 1)
        })?;
    }
    Ok(())
}

/// Report every required field that is still zero.
///
/// # Errors
///
/// Returns [`ConfigError::Required`] for a single blank field and an
/// aggregate when several are blank.
pub(crate) fn check_required(schema: &Schema, record: &Value) -> ConfigResult<()> {
    let mut errors = Vec::new();
    check_level(schema, record, &[], 0, &mut errors)?;
    ConfigError::try_aggregate(errors).map_or(Ok(()), |err| Err(Arc::new(err)))
}

fn check_level(
    schema: &Schema,
    record: &Value,
    base: &[String],
    depth: usize,
    errors: &mut Vec<Arc<ConfigError>>,
) -> ConfigResult<()> {
    for field in schema {
        let path = join(base, field);
        if field.is_required() && tree::is_zero(tree::get(record, &path)) {
            errors.push(Arc::new(ConfigError::Required {
                path: path.join("."),
            }));
        }
        let shape = record_shape(record, &path);
        visit_nested(field, &path, shape, depth, |describe, nested_base| {
            let nested = Schema::from_describe(describe)?;
            check_level(&nested, record, nested_base, depth + 1, errors)
        })?;
    }
    Ok(())
}

fn join(base: &[String], field: &FieldDescriptor) -> Vec<String> {
    let mut path = base.to_vec();
    path.extend_from_slice(field.path());
    path
}

/// What the record holds at a field's path, as far as nesting is concerned.
#[derive(Clone, Copy)]
enum Shape {
    List(usize),
    Object,
    Other,
}

fn record_shape(record: &Value, path: &[String]) -> Shape {
    match tree::get(record, path) {
        Some(Value::Array(items)) => Shape::List(items.len()),
        Some(Value::Object(_)) => Shape::Object,
        _ => Shape::Other,
    }
}

/// Call `visit` for each list element and for a present optional struct
/// under `field`.
fn visit_nested<F>(
    field: &FieldDescriptor,
    path: &[String],
    shape: Shape,
    depth: usize,
    mut visit: F,
) -> ConfigResult<()>
where
    F: FnMut(Describe, &[String]) -> ConfigResult<()>,
{
    if depth >= MAX_DEPTH {
        return Ok(());
    }
    let ty = field.value_type();
    if let Some(describe) = ty.slice_element().and_then(|element| element.as_struct()) {
        let Shape::List(len) = shape else {
            return Ok(());
        };
        for index in 0..len {
            let mut element = path.to_vec();
            element.push(index.to_string());
            visit(describe, &element)?;
        }
    } else if ty.is_optional()
        && let Some(describe) = ty.as_struct()
        && matches!(shape, Shape::Object)
    {
        visit(describe, path)?;
    }
    Ok(())
}
