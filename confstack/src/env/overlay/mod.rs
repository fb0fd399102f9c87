//! Overlay of environment variables onto a merge record.
//!
//! A field at path `db.port` is read from `<PREFIX>_db_port`, then from
//! `<PREFIX>_DB_PORT`. Elements of lists of structs are addressed by index
//! (`<PREFIX>_MENUS_0_NAME`); when the list is empty, indices are probed from
//! zero until one matches nothing.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{info, trace};

use super::{CONFIG_ENV, CONFIG_ENV_PREFIX, EnvVars, convert::convert};
use crate::merge::merge_value;
use crate::schema::{Describe, FieldDescriptor, Kind, MAX_DEPTH, Schema};
use crate::{ConfigResult, tree};

/// Where a level of the record lives and how its variables are named.
struct Scope<'p> {
    /// Path of the level within the record.
    record: &'p [String],
    /// Name segments of the level, without the prefix.
    names: &'p [String],
    /// Whether explicit aliases apply; they do not inside list elements.
    aliases: bool,
    depth: usize,
}

impl Scope<'_> {
    fn field_paths(&self, field: &FieldDescriptor) -> (Vec<String>, Vec<String>) {
        let mut record = self.record.to_vec();
        record.extend_from_slice(field.path());
        let mut names = self.names.to_vec();
        names.extend_from_slice(field.path());
        (record, names)
    }
}

/// Applies environment variables to records and remembers which variable
/// names correspond to a field.
pub(crate) struct Overlay<'a> {
    env: &'a EnvVars,
    prefix: Option<&'a str>,
    recognised: BTreeSet<String>,
    debug: bool,
}

impl<'a> Overlay<'a> {
    pub(crate) const fn new(env: &'a EnvVars, prefix: Option<&'a str>, debug: bool) -> Self {
        Self {
            env,
            prefix,
            recognised: BTreeSet::new(),
            debug,
        }
    }

    /// Overlay every field of `schema` onto `record`, returning the number of
    /// variables applied.
    pub(crate) fn apply(&mut self, schema: &Schema, record: &mut Value) -> ConfigResult<usize> {
        let scope = Scope {
            record: &[],
            names: &[],
            aliases: true,
            depth: 0,
        };
        self.level(schema, record, &scope)
    }

    /// Prefixed variables that no field reads, excluding the loader's own
    /// control variables. Without a prefix nothing is reported.
    pub(crate) fn unmatched(&self) -> Vec<String> {
        let Some(prefix) = self.prefix else {
            return Vec::new();
        };
        let head = format!("{prefix}_");
        self.env
            .iter()
            .filter(|(name, value)| {
                !value.is_empty()
                    && super::starts_with_ignore_case(name, &head)
                    && *name != CONFIG_ENV
                    && *name != CONFIG_ENV_PREFIX
                    && !self.recognised.contains(*name)
            })
            .map(|(name, _)| name.to_owned())
            .collect()
    }

    fn variable_name(&self, names: &[String]) -> String {
        let joined = names.join("_");
        match self.prefix {
            Some(prefix) if joined.is_empty() => prefix.to_owned(),
            Some(prefix) => format!("{prefix}_{joined}"),
            None => joined,
        }
    }

    fn level(
        &mut self,
        schema: &Schema,
        record: &mut Value,
        scope: &Scope<'_>,
    ) -> ConfigResult<usize> {
        let mut hits = 0;
        for field in schema {
            let (record_path, names) = scope.field_paths(field);
            hits += self.field(field, record, &record_path, &names, scope)?;
        }
        Ok(hits)
    }

    fn field(
        &mut self,
        field: &FieldDescriptor,
        record: &mut Value,
        record_path: &[String],
        names: &[String],
        scope: &Scope<'_>,
    ) -> ConfigResult<usize> {
        let ty = field.value_type();
        let mut hits = 0;
        if let Some((name, raw)) = self.lookup(field, names, scope.aliases) {
            let value = convert(raw, ty, &name)?;
            if matches!(ty.kind(), Kind::Struct | Kind::Map) {
                let mut current = tree::get(record, record_path)
                    .cloned()
                    .unwrap_or(Value::Null);
                merge_value(&mut current, value);
                tree::set(record, record_path, current);
            } else {
                tree::set(record, record_path, value);
            }
            let field_key = record_path.join(".");
            if self.debug {
                info!(variable = %name, field = %field_key, "applied environment variable");
            } else {
                trace!(variable = %name, field = %field_key, "applied environment variable");
            }
            hits += 1;
        }

        let element = ty.slice_element().and_then(|element| element.as_struct());
        if let Some(describe) = element {
            hits += self.list_elements(describe, record, record_path, names, scope.depth)?;
        } else if ty.is_optional()
            && let Some(describe) = ty.as_struct()
        {
            hits += self.optional_struct(describe, record, record_path, names, scope)?;
        }
        Ok(hits)
    }

    /// Variable name and value for `field`, recording every candidate name.
    fn lookup(
        &mut self,
        field: &FieldDescriptor,
        names: &[String],
        aliases: bool,
    ) -> Option<(String, &'a str)> {
        let env = self.env;
        if aliases && let Some(alias) = field.env_alias() {
            self.recognised.insert(alias.to_owned());
            return env.get(alias).map(|raw| (alias.to_owned(), raw));
        }
        let verbatim = self.variable_name(names);
        let upper = verbatim.to_uppercase();
        self.recognised.insert(verbatim.clone());
        self.recognised.insert(upper.clone());
        [verbatim, upper]
            .into_iter()
            .find_map(|name| env.get(&name).map(|raw| (name, raw)))
    }

    fn has_variables_under(&self, names: &[String]) -> bool {
        self.env
            .any_starting_with(&format!("{}_", self.variable_name(names)))
    }

    fn list_elements(
        &mut self,
        describe: Describe,
        record: &mut Value,
        record_path: &[String],
        names: &[String],
        depth: usize,
    ) -> ConfigResult<usize> {
        if depth >= MAX_DEPTH || !self.has_variables_under(names) {
            return Ok(0);
        }
        let existing = tree::get(record, record_path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let schema = Schema::from_describe(describe)?;
        let mut hits = 0;

        if existing > 0 {
            for index in 0..existing {
                let mut element_path = record_path.to_vec();
                element_path.push(index.to_string());
                let mut element_names = names.to_vec();
                element_names.push(index.to_string());
                let scope = Scope {
                    record: &element_path,
                    names: &element_names,
                    aliases: false,
                    depth: depth + 1,
                };
                hits += self.level(&schema, record, &scope)?;
            }
            return Ok(hits);
        }

        let mut elements = Vec::new();
        for index in 0_usize.. {
            let mut element_names = names.to_vec();
            element_names.push(index.to_string());
            if !self.has_variables_under(&element_names) {
                break;
            }
            let mut element = Value::Object(Map::new());
            let scope = Scope {
                record: &[],
                names: &element_names,
                aliases: false,
                depth: depth + 1,
            };
            let applied = self.level(&schema, &mut element, &scope)?;
            if applied == 0 {
                break;
            }
            hits += applied;
            elements.push(element);
        }
        if !elements.is_empty() {
            tree::set(record, record_path, Value::Array(elements));
        }
        Ok(hits)
    }

    fn optional_struct(
        &mut self,
        describe: Describe,
        record: &mut Value,
        record_path: &[String],
        names: &[String],
        scope: &Scope<'_>,
    ) -> ConfigResult<usize> {
        if scope.depth >= MAX_DEPTH || !self.has_variables_under(names) {
            return Ok(0);
        }
        let schema = Schema::from_describe(describe)?;
        let present = tree::get(record, record_path).is_some_and(Value::is_object);
        let mut inner = Scope {
            record: record_path,
            names,
            aliases: scope.aliases,
            depth: scope.depth + 1,
        };
        if present {
            return self.level(&schema, record, &inner);
        }
        let mut value = Value::Object(Map::new());
        inner.record = &[];
        let applied = self.level(&schema, &mut value, &inner)?;
        if applied > 0 {
            tree::set(record, record_path, value);
        }
        Ok(applied)
    }
}
