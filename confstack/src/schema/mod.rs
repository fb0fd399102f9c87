//! Static field descriptions for configuration records.
//!
//! Every record implements [`Configure`], registering its fields with a
//! [`FieldSet`]. [`Schema`] expands those registrations into a flat list of
//! [`FieldDescriptor`]s addressed by their full path, promoting the children
//! of anonymous fields into their parent's namespace.

mod descriptor;
mod value_type;

use std::collections::HashSet;

use serde::{Serialize, de::DeserializeOwned};
use uncased::Uncased;

use crate::{ConfigError, ConfigResult, env::convert};

pub use descriptor::{FieldDescriptor, FieldOptions, FieldSet};
pub use value_type::{ConfigValue, Describe, Kind, ValueType};

use descriptor::Declaration;

/// Nesting depth at which schema construction gives up.
pub const MAX_DEPTH: usize = 32;

/// Implemented by configuration records, normally through
/// `#[derive(Configure)]`.
///
/// ```
/// use confstack::{Configure, FieldOptions, FieldSet};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Configure for Server {
///     fn describe(fields: &mut FieldSet) {
///         fields
///             .field::<String>("host", FieldOptions::new().with_default("localhost"))
///             .field::<u16>("port", FieldOptions::new().required());
///     }
/// }
///
/// let schema = confstack::Schema::of::<Server>()?;
/// assert_eq!(schema.len(), 2);
/// # Ok::<(), std::sync::Arc<confstack::ConfigError>>(())
/// ```
pub trait Configure: Serialize + DeserializeOwned {
    /// Register every public field of the record.
    fn describe(fields: &mut FieldSet);

    /// Environment variable prefix declared by the record, used when neither
    /// the loader settings nor `CONFIG_ENV_PREFIX` provide one.
    #[must_use]
    fn env_prefix() -> Option<&'static str> {
        None
    }
}

/// Flattened descriptor set of one record type.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build the schema of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] for duplicate paths, anonymous fields
    /// that are not structs or runaway nesting, and
    /// [`ConfigError::Conversion`] for default literals that do not fit the
    /// field's type.
    pub fn of<T: Configure>() -> ConfigResult<Self> {
        Self::from_describe(T::describe)
    }

    /// Build a schema from a registration function.
    ///
    /// Fields of nested structs are expanded; elements of lists, maps and
    /// optional values are left to [`Schema::from_describe`] calls on the
    /// element type, which keeps self-referential records finite.
    ///
    /// # Errors
    ///
    /// See [`Schema::of`].
    pub fn from_describe(describe: Describe) -> ConfigResult<Self> {
        let mut builder = Builder::default();
        builder.collect(describe, &[], false, 0)?;
        Ok(Self {
            fields: builder.fields,
        })
    }

    /// Descriptors in declaration order, parents before their children.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Iterate over the descriptors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    /// Number of descriptors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record declares no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Descriptor at the exact `path`.
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| same_path(field.path(), path))
    }

    /// Descriptors one level below `parent`; an empty parent yields the
    /// top-level fields.
    pub fn children<'a, S: AsRef<str>>(
        &'a self,
        parent: &'a [S],
    ) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields.iter().filter(move |field| {
            field.path.len() == parent.len() + 1
                && field
                    .path
                    .get(..parent.len())
                    .is_some_and(|prefix| same_path(prefix, parent))
        })
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn same_path<S: AsRef<str>>(left: &[String], right: &[S]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l == r.as_ref())
}

#[derive(Default)]
struct Builder {
    fields: Vec<FieldDescriptor>,
    seen: HashSet<Uncased<'static>>,
}

impl Builder {
    fn collect(
        &mut self,
        describe: Describe,
        parent: &[String],
        promoted: bool,
        depth: usize,
    ) -> ConfigResult<()> {
        if depth > MAX_DEPTH {
            return Err(ConfigError::schema(
                parent.join("."),
                format!("nesting exceeds {MAX_DEPTH} levels"),
            ));
        }
        let mut set = FieldSet::default();
        describe(&mut set);
        for declaration in set.into_declarations() {
            self.declare(declaration, parent, promoted, depth)?;
        }
        Ok(())
    }

    fn declare(
        &mut self,
        declaration: Declaration,
        parent: &[String],
        promoted: bool,
        depth: usize,
    ) -> ConfigResult<()> {
        let Declaration { name, ty, options } = declaration;
        if options.is_anonymous() {
            let Some(inner) = ty.as_struct() else {
                let mut path = parent.to_vec();
                path.push(name);
                return Err(ConfigError::schema(
                    path.join("."),
                    format!("only struct fields can be anonymous, found {}", ty.describe()),
                ));
            };
            return self.collect(inner, parent, true, depth + 1);
        }

        let mut path = parent.to_vec();
        path.push(name);
        let key = path.join(".");
        if !self.seen.insert(Uncased::from_owned(key.clone())) {
            return Err(ConfigError::schema(key, "field path is declared more than once"));
        }
        if let Some(literal) = options.default_literal() {
            convert::convert(literal, ty, &key)?;
        }
        self.fields.push(FieldDescriptor {
            path: path.clone(),
            ty,
            options,
            promoted,
        });
        if let ValueType::Struct(inner) = ty {
            self.collect(inner, &path, false, depth + 1)?;
        }
        Ok(())
    }
}
