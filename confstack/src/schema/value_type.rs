//! Declared value types and their mapping from Rust types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::{DateTime, FixedOffset, Utc};

use super::FieldSet;

/// Registration function generated for every [`crate::Configure`] record.
pub type Describe = fn(&mut FieldSet);

/// Declared type of a configuration field.
///
/// Collection and optional element types are resolved lazily through
/// function pointers, so records that contain themselves (for example a
/// menu with child menus) still have a finite description.
#[derive(Clone, Copy)]
pub enum ValueType {
    /// UTF-8 text, including paths.
    String,
    /// Signed integer accepting `min..=max`.
    Int {
        /// Smallest value of the Rust type.
        min: i64,
        /// Largest value of the Rust type.
        max: i64,
    },
    /// Unsigned integer accepting `0..=max`.
    Uint {
        /// Largest value of the Rust type.
        max: u64,
    },
    /// Floating point number.
    Float,
    /// Boolean flag.
    Bool,
    /// `std::time::Duration`, written as a literal such as `1h30m`.
    Duration,
    /// RFC 3339 timestamp.
    Time,
    /// Nested record described by its own registration function.
    Struct(Describe),
    /// Sequence of elements.
    Slice(fn() -> ValueType),
    /// Value that may be absent.
    Optional(fn() -> ValueType),
    /// String-keyed map with dynamic keys.
    Map(fn() -> ValueType),
}

/// Tag identifying a [`ValueType`] without its element information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// See [`ValueType::String`].
    String,
    /// See [`ValueType::Int`].
    Int,
    /// See [`ValueType::Uint`].
    Uint,
    /// See [`ValueType::Float`].
    Float,
    /// See [`ValueType::Bool`].
    Bool,
    /// See [`ValueType::Duration`].
    Duration,
    /// See [`ValueType::Time`].
    Time,
    /// See [`ValueType::Struct`].
    Struct,
    /// See [`ValueType::Slice`].
    Slice,
    /// See [`ValueType::Map`].
    Map,
}

impl ValueType {
    /// The type with any [`ValueType::Optional`] layers removed.
    #[must_use]
    pub fn required_type(self) -> Self {
        let mut ty = self;
        while let Self::Optional(inner) = ty {
            ty = inner();
        }
        ty
    }

    /// Whether the field may be absent.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Tag of the underlying type; optional layers are transparent.
    #[must_use]
    pub fn kind(self) -> Kind {
        match self.required_type() {
            Self::String => Kind::String,
            Self::Int { .. } => Kind::Int,
            Self::Uint { .. } => Kind::Uint,
            Self::Float => Kind::Float,
            Self::Bool => Kind::Bool,
            Self::Duration => Kind::Duration,
            Self::Time => Kind::Time,
            Self::Struct(_) => Kind::Struct,
            Self::Slice(_) => Kind::Slice,
            // `required_type` never returns `Optional`.
            Self::Map(_) | Self::Optional(_) => Kind::Map,
        }
    }

    /// Registration function of a struct, looking through optional layers.
    #[must_use]
    pub fn as_struct(self) -> Option<Describe> {
        match self.required_type() {
            Self::Struct(describe) => Some(describe),
            _ => None,
        }
    }

    /// Element type of a slice, looking through optional layers.
    #[must_use]
    pub fn slice_element(self) -> Option<Self> {
        match self.required_type() {
            Self::Slice(element) => Some(element()),
            _ => None,
        }
    }

    /// Human-readable name used in conversion errors.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self.kind() {
            Kind::String => "string",
            Kind::Int => "integer",
            Kind::Uint => "unsigned integer",
            Kind::Float => "float",
            Kind::Bool => "boolean",
            Kind::Duration => "duration",
            Kind::Time => "RFC 3339 timestamp",
            Kind::Struct => "struct",
            Kind::Slice => "list",
            Kind::Map => "map",
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Slice(element) => f.debug_tuple("Slice").field(&element()).finish(),
            Self::Optional(inner) => f.debug_tuple("Optional").field(&inner()).finish(),
            Self::Map(value) => f.debug_tuple("Map").field(&value()).finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Types that can appear as configuration fields.
///
/// Implemented for the standard scalar types, common collections and, via
/// `#[derive(Configure)]`, for configuration records themselves.
pub trait ConfigValue {
    /// Declared type used for environment conversion, defaults and
    /// validation.
    fn value_type() -> ValueType;
}

macro_rules! config_value {
    ($variant:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }
            }
        )+
    };
}

macro_rules! config_integer {
    (Int => $($ty:ty),+) => {
        $(
            impl ConfigValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::Int {
                        min: i64::from(<$ty>::MIN),
                        max: i64::from(<$ty>::MAX),
                    }
                }
            }
        )+
    };
    (Uint => $($ty:ty),+) => {
        $(
            impl ConfigValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::Uint {
                        max: u64::from(<$ty>::MAX),
                    }
                }
            }
        )+
    };
}

config_value!(String => String, PathBuf, Utf8PathBuf);
config_integer!(Int => i8, i16, i32);
config_integer!(Uint => u8, u16, u32);
config_value!(Float => f32, f64);
config_value!(Bool => bool);
config_value!(Duration => Duration);
config_value!(Time => DateTime<Utc>, DateTime<FixedOffset>);

impl ConfigValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int {
            min: Self::MIN,
            max: Self::MAX,
        }
    }
}

impl ConfigValue for u64 {
    fn value_type() -> ValueType {
        ValueType::Uint { max: Self::MAX }
    }
}

impl ConfigValue for isize {
    fn value_type() -> ValueType {
        ValueType::Int {
            min: i64::try_from(Self::MIN).unwrap_or(i64::MIN),
            max: i64::try_from(Self::MAX).unwrap_or(i64::MAX),
        }
    }
}

impl ConfigValue for usize {
    fn value_type() -> ValueType {
        ValueType::Uint {
            max: u64::try_from(Self::MAX).unwrap_or(u64::MAX),
        }
    }
}

impl<T: ConfigValue> ConfigValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Optional(T::value_type)
    }
}

impl<T: ConfigValue> ConfigValue for Box<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }
}

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::Slice(T::value_type)
    }
}

impl<T: ConfigValue> ConfigValue for VecDeque<T> {
    fn value_type() -> ValueType {
        ValueType::Slice(T::value_type)
    }
}

impl<T: ConfigValue> ConfigValue for BTreeSet<T> {
    fn value_type() -> ValueType {
        ValueType::Slice(T::value_type)
    }
}

impl<T: ConfigValue, S> ConfigValue for HashSet<T, S> {
    fn value_type() -> ValueType {
        ValueType::Slice(T::value_type)
    }
}

impl<V: ConfigValue> ConfigValue for BTreeMap<String, V> {
    fn value_type() -> ValueType {
        ValueType::Map(V::value_type)
    }
}

impl<V: ConfigValue, S> ConfigValue for HashMap<String, V, S> {
    fn value_type() -> ValueType {
        ValueType::Map(V::value_type)
    }
}
