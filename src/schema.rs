use crate::error::{ConversionError, Result};
use serde_json::{Map, Value};

/// A parsed schema document.
///
/// Schema producers disagree on the outer shape of the document, so parsing
/// settles on exactly one interpretation, checked in this order:
///
/// 1. `{ "json": <schema> }` envelope: the wrapped schema becomes the root.
/// 2. A document carrying `$defs` or `definitions`: the whole document is the
///    root and the definitions map is kept aside for `$ref` lookups.
/// 3. Anything else is a bare schema used as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    root: Value,
    definitions: Map<String, Value>,
}

impl SchemaDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let full: Value =
            serde_json::from_str(text).map_err(|e| ConversionError::ParseError(e.to_string()))?;
        Self::from_value(full)
    }

    pub fn from_value(full: Value) -> Result<Self> {
        let Value::Object(mut full) = full else {
            return Err(ConversionError::ParseError(format!(
                "expected a JSON object at the document root, found {}",
                kind_of(&full)
            )));
        };

        if full.contains_key("json") {
            let root = match full.remove("json") {
                Some(Value::Object(inner)) => Value::Object(inner),
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(other) => {
                    return Err(ConversionError::ParseError(format!(
                        "expected the `json` envelope to hold an object, found {}",
                        kind_of(&other)
                    )));
                }
            };
            return Ok(Self {
                root,
                definitions: Map::new(),
            });
        }

        let definitions = full
            .get("$defs")
            .or_else(|| full.get("definitions"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            root: Value::Object(full),
            definitions,
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn definitions(&self) -> &Map<String, Value> {
        &self.definitions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

impl SingleType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            _ => None,
        }
    }
}

/// The `type` keyword of a schema node.
///
/// Entries of a type array that are not recognized type names are kept as
/// `None` so each one can still degrade to an untyped member.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Single(SingleType),
    Multiple(Vec<Option<SingleType>>),
}

impl SchemaType {
    /// Returns `None` when `type` is absent or not a recognized type name.
    pub fn of(node: &Value) -> Option<Self> {
        match node.get("type")? {
            Value::String(name) => SingleType::parse(name).map(Self::Single),
            Value::Array(names) => Some(Self::Multiple(
                names
                    .iter()
                    .map(|name| name.as_str().and_then(SingleType::parse))
                    .collect(),
            )),
            _ => None,
        }
    }
}

/// True when the node declares `"type": "null"` and nothing else.
pub fn is_null_schema(node: &Value) -> bool {
    matches!(SchemaType::of(node), Some(SchemaType::Single(SingleType::Null)))
}

pub fn properties(node: &Value) -> Option<&Map<String, Value>> {
    node.get("properties").and_then(Value::as_object)
}

pub fn required_names(node: &Value) -> Vec<&str> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub fn description(node: &Value) -> Option<String> {
    node.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
