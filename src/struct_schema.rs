use crate::converter::DEFAULT_MAX_DEPTH;
use crate::describe::{Describe, FieldType, StructDescription};
use crate::error::{ConversionError, Result};
use serde_json::{Map, Value, json};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSchemaOptions {
    /// Permit map fields, emitted as `additionalProperties` schemas. Off by
    /// default because structured-output endpoints reject open objects.
    pub allow_maps: bool,
    pub max_depth: usize,
}

impl Default for StructSchemaOptions {
    fn default() -> Self {
        Self {
            allow_maps: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builds closed JSON Schemas from struct descriptions.
///
/// Every object level gets `additionalProperties: false` and lists every
/// non-skipped field in `required`, including fields of `Option` type: a
/// nullable field must still be present, as `null`. Nested structs are
/// inlined, never referenced.
#[derive(Debug, Clone, Default)]
pub struct StructSchemaConverter {
    options: StructSchemaOptions,
}

impl StructSchemaConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StructSchemaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StructSchemaOptions {
        &self.options
    }

    pub fn convert(&self, description: &StructDescription) -> Result<Value> {
        let schema = self.object_schema(description, 0)?;
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .map_or(0, Map::len);
        debug!(name = %description.name, properties, "generated struct schema");
        Ok(Value::Object(schema))
    }

    /// Converts the description `T` reports, which must be a struct.
    pub fn schema_for<T: Describe + ?Sized>(&self) -> Result<Value> {
        match T::describe() {
            FieldType::Struct(description) => self.convert(&description),
            other => Err(ConversionError::NotAStruct(other.label())),
        }
    }

    fn object_schema(&self, description: &StructDescription, depth: usize) -> Result<Map<String, Value>> {
        self.check_depth(depth)?;

        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &description.fields {
            if field.skip {
                debug!(structure = %description.name, field = %field.name, "skipping field");
                continue;
            }

            let mut schema = self.type_schema(&field.ty, &field.name, depth + 1)?;
            if let Some(text) = &field.description {
                schema.insert("description".to_string(), Value::String(text.clone()));
            }

            properties.insert(field.name.clone(), Value::Object(schema));
            required.push(Value::String(field.name.clone()));
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
        Ok(schema)
    }

    fn type_schema(&self, ty: &FieldType, field: &str, depth: usize) -> Result<Map<String, Value>> {
        self.check_depth(depth)?;

        let schema = match ty {
            FieldType::String => primitive("string"),
            FieldType::Integer => primitive("integer"),
            FieldType::Float => primitive("number"),
            FieldType::Boolean => primitive("boolean"),
            FieldType::Null => primitive("null"),
            FieldType::Struct(description) => return self.object_schema(description, depth),
            FieldType::Enum(description) => {
                let mut schema = primitive("string");
                schema.insert("enum".to_string(), json!(description.values));
                schema
            }
            FieldType::Union { members } => return self.union_schema(members, field, depth),
            FieldType::Array { items } => {
                let mut schema = primitive("array");
                let items = self.type_schema(items, field, depth + 1)?;
                schema.insert("items".to_string(), Value::Object(items));
                schema
            }
            FieldType::Map { key, value } => {
                if !self.options.allow_maps {
                    return Err(ConversionError::MapNotAllowed {
                        field: field.to_string(),
                    });
                }
                if **key != FieldType::String {
                    return Err(ConversionError::UnsupportedMapKey(key.label()));
                }
                let mut schema = primitive("object");
                let value = self.type_schema(value, field, depth + 1)?;
                schema.insert("additionalProperties".to_string(), Value::Object(value));
                schema
            }
            FieldType::Opaque { name } => return Err(ConversionError::UnsupportedType(name.clone())),
            FieldType::Deferred(deferred) => {
                return self.type_schema(&deferred.expand(), field, depth + 1);
            }
        };

        Ok(schema)
    }

    /// Structurally identical member schemas collapse; a lone survivor is
    /// emitted without the `anyOf` wrapper.
    fn union_schema(&self, members: &[FieldType], field: &str, depth: usize) -> Result<Map<String, Value>> {
        let mut distinct: Vec<Map<String, Value>> = Vec::with_capacity(members.len());
        for member in members {
            let schema = self.type_schema(member, field, depth + 1)?;
            if !distinct.contains(&schema) {
                distinct.push(schema);
            }
        }

        match distinct.len() {
            0 => Err(ConversionError::UnsupportedType(format!(
                "empty union in field `{field}`"
            ))),
            1 => Ok(distinct.remove(0)),
            _ => {
                let mut schema = Map::new();
                schema.insert(
                    "anyOf".to_string(),
                    Value::Array(distinct.into_iter().map(Value::Object).collect()),
                );
                Ok(schema)
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(ConversionError::RecursionLimit {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }
}

fn primitive(name: &str) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::String(name.to_string()));
    schema
}

/// Schema for `T` with default options.
pub fn schema_for<T: Describe + ?Sized>() -> Result<Value> {
    StructSchemaConverter::new().schema_for::<T>()
}
