//! Key normalisation and unmatched-key collection for decoded files.

use serde_json::{Map, Value};
use uncased::UncasedStr;

use crate::ConfigResult;
use crate::schema::{FieldDescriptor, MAX_DEPTH, Schema, ValueType};

/// Align the keys of a decoded file with the declared field names.
///
/// Keys matching a field exactly are kept. Keys matching a field ASCII
/// case-insensitively are renamed to the declared name unless that name is
/// already present. Every other key is removed from `record` and its dotted
/// path appended to `unmatched`, depth-first in the record's (sorted) key
/// order. Contents of map-typed fields are left alone.
pub(crate) fn normalise(
    schema: &Schema,
    record: &mut Value,
    unmatched: &mut Vec<String>,
) -> ConfigResult<()> {
    Normaliser { unmatched }.level(schema, &[], record, &[], 0)
}

struct Normaliser<'u> {
    unmatched: &'u mut Vec<String>,
}

impl Normaliser<'_> {
    fn level(
        &mut self,
        schema: &Schema,
        parent: &[String],
        node: &mut Value,
        shown: &[String],
        depth: usize,
    ) -> ConfigResult<()> {
        let Value::Object(map) = node else {
            return Ok(());
        };
        let declared: Vec<&FieldDescriptor> = schema.children(parent).collect();
        align_keys(&declared, map);

        // Depth-first in the record's key order.
        let keys: Vec<String> = map.keys().cloned().collect();
        for key in keys {
            if let Some(field) = declared.iter().find(|field| field.name() == key) {
                let Some(child) = map.get_mut(&key) else {
                    continue;
                };
                let mut child_shown = shown.to_vec();
                child_shown.push(key);
                self.nested(schema, field, child, &child_shown, depth)?;
            } else if folded(&declared, &key).is_none() {
                map.remove(&key);
                let mut path = shown.to_vec();
                path.push(key);
                self.unmatched.push(path.join("."));
            }
        }
        Ok(())
    }

    fn nested(
        &mut self,
        schema: &Schema,
        field: &FieldDescriptor,
        child: &mut Value,
        shown: &[String],
        depth: usize,
    ) -> ConfigResult<()> {
        let ty = field.value_type();
        if let ValueType::Struct(_) = ty {
            return self.level(schema, field.path(), child, shown, depth);
        }
        if depth >= MAX_DEPTH {
            return Ok(());
        }
        if let Some(describe) = ty.slice_element().and_then(|element| element.as_struct()) {
            let Value::Array(items) = child else {
                return Ok(());
            };
            let element_schema = Schema::from_describe(describe)?;
            for (index, item) in items.iter_mut().enumerate() {
                let mut element_shown = shown.to_vec();
                element_shown.push(index.to_string());
                self.level(&element_schema, &[], item, &element_shown, depth + 1)?;
            }
        } else if ty.is_optional()
            && let Some(describe) = ty.as_struct()
        {
            let inner = Schema::from_describe(describe)?;
            self.level(&inner, &[], child, shown, depth + 1)?;
        }
        Ok(())
    }
}

fn folded<'f>(declared: &[&'f FieldDescriptor], key: &str) -> Option<&'f FieldDescriptor> {
    declared
        .iter()
        .find(|field| UncasedStr::new(field.name()) == UncasedStr::new(key))
        .copied()
}

/// Rename case variants of declared fields to the declared name, unless
/// that name is already present.
fn align_keys(declared: &[&FieldDescriptor], map: &mut Map<String, Value>) {
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        if declared.iter().any(|field| field.name() == key) {
            continue;
        }
        if let Some(field) = folded(declared, &key)
            && !map.contains_key(field.name())
            && let Some(value) = map.remove(&key)
        {
            map.insert(field.name().to_owned(), value);
        }
    }
}
