//! Field registration and the descriptors built from it.

use super::value_type::{ConfigValue, Kind, ValueType};

/// Per-field options recorded alongside the declared type.
///
/// Populated by `#[derive(Configure)]` from `#[config(...)]` attributes, or by
/// hand in a manual [`crate::Configure`] implementation.
///
/// ```
/// use confstack::FieldOptions;
///
/// let options = FieldOptions::new().with_default("3306").required();
/// assert_eq!(options.default_literal(), Some("3306"));
/// assert!(options.is_required());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOptions {
    default: Option<String>,
    required: bool,
    env: Option<String>,
    anonymous: bool,
}

impl FieldOptions {
    /// Options with no default, alias or flags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default: None,
            required: false,
            env: None,
            anonymous: false,
        }
    }

    /// Literal applied when the field is still zero after every source.
    #[must_use]
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Fail the load when the field is still zero after defaulting.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Read the field from this environment variable instead of the derived
    /// name.
    #[must_use]
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    /// Promote the children of this struct field into the parent namespace.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Default literal, if any.
    #[must_use]
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Explicit environment variable name, if any.
    #[must_use]
    pub fn env_alias(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Whether the field is anonymous.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }
}

#[derive(Clone, Debug)]
pub(super) struct Declaration {
    pub(super) name: String,
    pub(super) ty: ValueType,
    pub(super) options: FieldOptions,
}

/// Collector passed to [`crate::Configure::describe`].
#[derive(Debug, Default)]
pub struct FieldSet {
    declarations: Vec<Declaration>,
}

impl FieldSet {
    /// Register a field named `name` (its serialised key) of type `T`.
    pub fn field<T: ConfigValue>(
        &mut self,
        name: impl Into<String>,
        options: FieldOptions,
    ) -> &mut Self {
        self.declarations.push(Declaration {
            name: name.into(),
            ty: T::value_type(),
            options,
        });
        self
    }

    /// Number of registered fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no field has been registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub(super) fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }
}

/// One addressable field of a configuration record.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub(super) path: Vec<String>,
    pub(super) ty: ValueType,
    pub(super) options: FieldOptions,
    pub(super) promoted: bool,
}

impl FieldDescriptor {
    /// Segments from the record root to this field.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    /// Dotted path, as used in error messages.
    #[must_use]
    pub fn key(&self) -> String {
        self.path.join(".")
    }

    /// Declared type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.ty
    }

    /// Tag of the declared type.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.ty.kind()
    }

    /// Default literal, if any.
    #[must_use]
    pub fn default_literal(&self) -> Option<&str> {
        self.options.default_literal()
    }

    /// Whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.options.is_required()
    }

    /// Explicit environment variable name, if any.
    #[must_use]
    pub fn env_alias(&self) -> Option<&str> {
        self.options.env_alias()
    }

    /// Whether the field was promoted from an anonymous composite.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.promoted
    }
}
