//! Declared shapes of Rust types, the input to [`crate::struct_schema`].
//!
//! Rust has no runtime reflection, so a struct that should be turned into a
//! schema describes itself: either by implementing [`Describe`] or by building
//! a [`StructDescription`] directly. Descriptions are plain serde data, which
//! also lets the CLI read them from JSON files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Struct(StructDescription),
    Enum(EnumDescription),
    Union { members: Vec<FieldType> },
    Array { items: Box<FieldType> },
    Map { key: Box<FieldType>, value: Box<FieldType> },
    /// A type with no schema mapping. Converting it is an error.
    Opaque { name: String },
    /// A Rust type whose description is built only when the converter reaches
    /// it, so self-referential types stay finite.
    #[serde(skip)]
    Deferred(Deferred),
}

impl FieldType {
    /// `inner` or null. Unions are extended in place rather than nested.
    pub fn nullable(inner: FieldType) -> Self {
        let mut members = match inner {
            FieldType::Union { members } => members,
            other => vec![other],
        };
        if !members.contains(&FieldType::Null) {
            members.push(FieldType::Null);
        }
        FieldType::Union { members }
    }

    pub fn array(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
        }
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Short human-readable name, used in error messages.
    pub fn label(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Null => "null".to_string(),
            FieldType::Struct(description) => format!("struct {}", description.name),
            FieldType::Enum(description) => format!("enum {}", description.name),
            FieldType::Union { .. } => "union".to_string(),
            FieldType::Array { .. } => "array".to_string(),
            FieldType::Map { .. } => "map".to_string(),
            FieldType::Opaque { name } => name.clone(),
            FieldType::Deferred(deferred) => deferred.name().to_string(),
        }
    }

    /// The description with any deferred outer layer expanded.
    pub fn expand(self) -> FieldType {
        match self {
            FieldType::Deferred(deferred) => deferred.expand().expand(),
            other => other,
        }
    }
}

/// Handle to `T::describe`, see [`FieldDescription::of`].
#[derive(Clone, Copy)]
pub struct Deferred {
    name: &'static str,
    describe: fn() -> FieldType,
}

impl Deferred {
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            describe: T::describe,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn expand(&self) -> FieldType {
        (self.describe)()
    }
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDescription {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
}

impl StructDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescription) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Left out of the schema entirely.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            skip: false,
        }
    }

    /// A field of Rust type `T`. `T` is described lazily, when the field is
    /// converted, which lets a struct hold fields of its own type.
    pub fn of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Deferred(Deferred::of::<T>()))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A string enum, by its serialized values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDescription {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDescription {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Types that can report their shape for schema generation.
///
/// ```
/// use json_schema_struct::{Describe, FieldDescription, FieldType, StructDescription};
///
/// struct Person {
///     name: String,
///     age: Option<i64>,
/// }
///
/// impl Describe for Person {
///     fn describe() -> FieldType {
///         FieldType::Struct(
///             StructDescription::new("Person")
///                 .field(FieldDescription::of::<String>("name"))
///                 .field(FieldDescription::of::<Option<i64>>("age")),
///         )
///     }
/// }
/// ```
pub trait Describe {
    fn describe() -> FieldType;
}

macro_rules! describe_as {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> FieldType {
                    $kind
                }
            }
        )+
    };
}

describe_as!(FieldType::String => String, str, char);
describe_as!(FieldType::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_as!(FieldType::Float => f32, f64);
describe_as!(FieldType::Boolean => bool);
describe_as!(FieldType::Null => ());

impl Describe for serde_json::Value {
    fn describe() -> FieldType {
        FieldType::Opaque {
            name: "serde_json::Value".to_string(),
        }
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> FieldType {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> FieldType {
        T::describe()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> FieldType {
        FieldType::nullable(T::describe())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> FieldType {
        FieldType::array(T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> FieldType {
        FieldType::array(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> FieldType {
        FieldType::array(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> FieldType {
        FieldType::array(T::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> FieldType {
        FieldType::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> FieldType {
        FieldType::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe() -> FieldType {
        FieldType::map(K::describe(), V::describe())
    }
}
