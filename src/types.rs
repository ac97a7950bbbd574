use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The type of a generated field, as a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeExpr {
    /// Untyped: no recognizable schema, or an unresolved `$ref`.
    Any,
    String,
    Integer,
    Float,
    Boolean,
    Null,
    /// A `date-time` formatted string.
    Timestamp,
    /// A synthesized record or enum, by name.
    Named(String),
    Array(Box<TypeExpr>),
    /// String-keyed map with the given value type.
    Map(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Nilable(Box<TypeExpr>),
}

impl TypeExpr {
    /// Wraps in `Nilable` unless already nilable or untyped.
    pub fn nilable(self) -> Self {
        match self {
            Self::Any | Self::Nilable(_) => self,
            other => Self::Nilable(Box::new(other)),
        }
    }

    pub fn is_nilable(&self) -> bool {
        matches!(self, Self::Nilable(_))
    }

    /// Collapses structurally identical members; a single survivor is returned
    /// bare and an empty member list is untyped.
    pub fn union_of(members: Vec<TypeExpr>) -> Self {
        let mut distinct: Vec<TypeExpr> = Vec::with_capacity(members.len());
        for member in members {
            if !distinct.contains(&member) {
                distinct.push(member);
            }
        }
        match distinct.len() {
            0 => Self::Any,
            1 => distinct.remove(0),
            _ => Self::Union(distinct),
        }
    }

    /// Names of the synthesized types this expression refers to, in order of appearance.
    pub fn referenced_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut IndexSet<String>) {
        match self {
            Self::Named(name) => {
                names.insert(name.clone());
            }
            Self::Array(inner) | Self::Map(inner) | Self::Nilable(inner) => {
                inner.collect_names(names)
            }
            Self::Union(members) => members.iter().for_each(|m| m.collect_names(names)),
            Self::Any
            | Self::String
            | Self::Integer
            | Self::Float
            | Self::Boolean
            | Self::Null
            | Self::Timestamp => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Value"),
            Self::String => f.write_str("String"),
            Self::Integer => f.write_str("i64"),
            Self::Float => f.write_str("f64"),
            Self::Boolean => f.write_str("bool"),
            Self::Null => f.write_str("()"),
            Self::Timestamp => f.write_str("DateTime<Utc>"),
            Self::Named(name) => f.write_str(name),
            Self::Array(inner) => write!(f, "Vec<{inner}>"),
            Self::Map(inner) => write!(f, "HashMap<String, {inner}>"),
            Self::Nilable(inner) => write!(f, "Option<{inner}>"),
            Self::Union(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub required: bool,
    /// One-line summary of the schema constraints carried by the property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Record,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionBody {
    Record { fields: Vec<Field> },
    Enum { members: Vec<EnumMember> },
}

/// A named record or enum produced by schema conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub body: DefinitionBody,
}

impl TypeDefinition {
    pub fn record(name: impl Into<String>, description: Option<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description,
            body: DefinitionBody::Record { fields },
        }
    }

    pub fn enumeration(name: impl Into<String>, members: Vec<EnumMember>) -> Self {
        Self {
            name: name.into(),
            description: None,
            body: DefinitionBody::Enum { members },
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        match self.body {
            DefinitionBody::Record { .. } => DefinitionKind::Record,
            DefinitionBody::Enum { .. } => DefinitionKind::Enum,
        }
    }

    /// Record fields; empty for enums.
    pub fn fields(&self) -> &[Field] {
        match &self.body {
            DefinitionBody::Record { fields } => fields,
            DefinitionBody::Enum { .. } => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|field| field.name == name)
    }

    /// Enum members; empty for records.
    pub fn members(&self) -> &[EnumMember] {
        match &self.body {
            DefinitionBody::Enum { members } => members,
            DefinitionBody::Record { .. } => &[],
        }
    }
}
