use crate::error::{ConversionError, Result};
use crate::graph::DependencyGraph;
use crate::naming;
use crate::resolver::RefResolver;
use crate::schema::{self, SchemaDocument, SchemaType, SingleType};
use crate::types::{EnumMember, Field, TypeDefinition, TypeExpr};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Keys summarized in a field's constraint comment, in output order.
const CONSTRAINT_KEYS: &[&str] = &[
    "minLength",
    "maxLength",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minItems",
    "maxItems",
    "format",
    "const",
    "default",
];

/// What happens when two schemas synthesize the same type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The first definition under a name wins and later schemas refer to it,
    /// even when their shapes differ.
    #[default]
    Reuse,
    /// Reuse only when the shapes match, fail with `NameCollision` otherwise.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Maximum nesting of schema nodes before conversion fails.
    pub max_depth: usize,
    pub collisions: CollisionPolicy,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collisions: CollisionPolicy::default(),
        }
    }
}

/// Converts JSON Schema documents into type definitions.
///
/// The converter itself holds only options; all working state lives in a
/// per-call context, so one converter can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct SchemaConverter {
    options: ConverterOptions,
}

impl SchemaConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConverterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Parses `text` and converts it, see [`SchemaConverter::convert`].
    pub fn convert_str(&self, text: &str, root_name: &str) -> Result<Vec<TypeDefinition>> {
        let document = SchemaDocument::parse(text)?;
        self.convert(&document, root_name)
    }

    /// Generates the root record and every type it needs.
    ///
    /// Dependencies are ordered before their dependents and the root record is
    /// always last.
    pub fn convert(&self, document: &SchemaDocument, root_name: &str) -> Result<Vec<TypeDefinition>> {
        let root_name = if naming::pascal_case(root_name).is_empty() {
            "Root".to_string()
        } else {
            naming::type_name(root_name)
        };
        Generation::new(document, &self.options).run(root_name)
    }
}

/// Working state of a single conversion.
struct Generation<'a> {
    options: &'a ConverterOptions,
    document: &'a SchemaDocument,
    resolver: RefResolver<'a>,
    /// Every synthesized name and the schema node that produced it. Names are
    /// reserved before their fields are generated so self references terminate.
    reserved: IndexMap<String, &'a Value>,
    definitions: HashMap<String, TypeDefinition>,
    /// Generation order of nested definitions, before dependency sorting.
    nested: VecDeque<String>,
    graph: DependencyGraph,
    active: usize,
}

impl<'a> Generation<'a> {
    fn new(document: &'a SchemaDocument, options: &'a ConverterOptions) -> Self {
        Self {
            options,
            document,
            resolver: RefResolver::new(document),
            reserved: IndexMap::new(),
            definitions: HashMap::new(),
            nested: VecDeque::new(),
            graph: DependencyGraph::new(),
            active: 0,
        }
    }

    fn run(mut self, root_name: String) -> Result<Vec<TypeDefinition>> {
        let root = self.resolver.resolve(self.document.root());
        self.reserved.insert(root_name.clone(), root);
        let root_definition = self.generate_struct(root, &root_name, 0)?;

        let nested: Vec<String> = self.nested.iter().cloned().collect();
        let order = self.graph.topological_order(&nested);

        let mut output = Vec::with_capacity(order.len() + 1);
        for name in order {
            if let Some(definition) = self.definitions.remove(&name) {
                output.push(definition);
            }
        }
        output.push(root_definition);

        debug!(root = %root_name, definitions = output.len(), "generated type definitions");
        Ok(output)
    }

    fn generate_struct(
        &mut self,
        node: &'a Value,
        class_name: &str,
        depth: usize,
    ) -> Result<TypeDefinition> {
        let required: HashSet<&str> = schema::required_names(node).into_iter().collect();
        let mut fields = Vec::new();

        if let Some(properties) = schema::properties(node) {
            for (prop_name, prop_schema) in properties {
                let ty = self.generate_type(prop_schema, prop_name, depth)?;
                let is_required = required.contains(prop_name.as_str());
                let ty = if is_required { ty } else { ty.nilable() };

                for dependency in ty.referenced_names() {
                    self.graph.add_edge(class_name, &dependency);
                }

                fields.push(Field {
                    name: prop_name.clone(),
                    ty,
                    required: is_required,
                    doc: constraint_comment(prop_schema),
                    description: schema::description(prop_schema),
                });
            }
        }

        Ok(TypeDefinition::record(
            class_name,
            schema::description(node),
            fields,
        ))
    }

    fn generate_type(&mut self, node: &'a Value, field: &str, depth: usize) -> Result<TypeExpr> {
        if self.active >= self.options.max_depth {
            return Err(ConversionError::RecursionLimit {
                limit: self.options.max_depth,
            });
        }
        self.active += 1;
        let ty = self.dispatch(node, field, depth);
        self.active -= 1;
        ty
    }

    fn dispatch(&mut self, node: &'a Value, field: &str, depth: usize) -> Result<TypeExpr> {
        let node = self.resolver.resolve(node);

        if let Some(members) = node
            .get("anyOf")
            .or_else(|| node.get("oneOf"))
            .and_then(Value::as_array)
        {
            return self.generate_union(members, field, depth);
        }

        match SchemaType::of(node) {
            Some(SchemaType::Multiple(types)) => {
                let nullable = types.contains(&Some(SingleType::Null));
                let mut members = Vec::with_capacity(types.len());
                for ty in types {
                    match ty {
                        Some(SingleType::Null) => {}
                        Some(ty) => members.push(self.generate_single(node, ty, field, depth)?),
                        None => members.push(TypeExpr::Any),
                    }
                }
                Ok(finish_union(members, nullable))
            }
            Some(SchemaType::Single(ty)) => self.generate_single(node, ty, field, depth),
            None => {
                if let Some(ty) = node.get("type") {
                    warn!(field, %ty, "unrecognized schema type, treating it as untyped");
                }
                Ok(TypeExpr::Any)
            }
        }
    }

    fn generate_union(&mut self, members: &'a [Value], field: &str, depth: usize) -> Result<TypeExpr> {
        let mut nullable = false;
        let mut types = Vec::with_capacity(members.len());

        for member in members {
            if schema::is_null_schema(self.resolver.resolve(member)) {
                nullable = true;
            } else {
                types.push(self.generate_type(member, field, depth)?);
            }
        }

        Ok(finish_union(types, nullable))
    }

    fn generate_single(
        &mut self,
        node: &'a Value,
        ty: SingleType,
        field: &str,
        depth: usize,
    ) -> Result<TypeExpr> {
        match ty {
            SingleType::String => self.generate_string(node, field),
            SingleType::Integer => Ok(TypeExpr::Integer),
            SingleType::Number => Ok(TypeExpr::Float),
            SingleType::Boolean => Ok(TypeExpr::Boolean),
            SingleType::Null => Ok(TypeExpr::Null),
            SingleType::Array => self.generate_array(node, field, depth),
            SingleType::Object => self.generate_object(node, field, depth),
        }
    }

    fn generate_string(&mut self, node: &'a Value, field: &str) -> Result<TypeExpr> {
        if node.get("format").and_then(Value::as_str) == Some("date-time") {
            return Ok(TypeExpr::Timestamp);
        }
        let Some(values) = node.get("enum").and_then(Value::as_array) else {
            return Ok(TypeExpr::String);
        };

        let name = naming::enum_name(field);
        if self.reuse(&name, node)? {
            return Ok(TypeExpr::Named(name));
        }

        self.reserved.insert(name.clone(), node);
        self.definitions.insert(
            name.clone(),
            TypeDefinition::enumeration(&name, enum_members(values)),
        );
        self.nested.push_back(name.clone());
        Ok(TypeExpr::Named(name))
    }

    fn generate_array(&mut self, node: &'a Value, field: &str, depth: usize) -> Result<TypeExpr> {
        let singular = naming::singularize(field);

        let tuple = match node.get("items") {
            Some(Value::Array(elements)) => Some(elements),
            _ => node.get("prefixItems").and_then(Value::as_array),
        };
        if let Some(elements) = tuple {
            let mut types = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let element_name = format!("{singular}_{index}");
                types.push(self.generate_type(element, &element_name, depth + 1)?);
            }
            return Ok(TypeExpr::Array(Box::new(TypeExpr::union_of(types))));
        }

        let item = match node.get("items") {
            Some(items @ Value::Object(_)) => self.generate_type(items, &singular, depth + 1)?,
            _ => TypeExpr::Any,
        };
        Ok(TypeExpr::Array(Box::new(item)))
    }

    fn generate_object(&mut self, node: &'a Value, field: &str, depth: usize) -> Result<TypeExpr> {
        if schema::properties(node).is_none() {
            if let Some(values @ Value::Object(_)) = node.get("additionalProperties") {
                let value = self.generate_type(values, &naming::singularize(field), depth + 1)?;
                return Ok(TypeExpr::Map(Box::new(value)));
            }
        }

        let name = naming::type_name(field);
        if self.reuse(&name, node)? {
            return Ok(TypeExpr::Named(name));
        }

        self.reserved.insert(name.clone(), node);
        let definition = self.generate_struct(node, &name, depth + 1)?;
        self.definitions.insert(name.clone(), definition);
        if depth + 1 > 1 {
            self.nested.push_front(name.clone());
        } else {
            self.nested.push_back(name.clone());
        }
        Ok(TypeExpr::Named(name))
    }

    /// True when `name` was already synthesized and should be referenced
    /// instead of generated again.
    fn reuse(&self, name: &str, node: &'a Value) -> Result<bool> {
        let Some(&previous) = self.reserved.get(name) else {
            return Ok(false);
        };
        if self.options.collisions == CollisionPolicy::Strict && shape(previous) != shape(node) {
            return Err(ConversionError::NameCollision {
                name: name.to_string(),
            });
        }
        debug!(name, "reusing generated type");
        Ok(true)
    }
}

/// The parts of a schema that decide what a synthesized type looks like.
fn shape(node: &Value) -> [Option<&Value>; 4] {
    [
        node.get("properties"),
        node.get("required"),
        node.get("additionalProperties"),
        node.get("enum"),
    ]
}

fn finish_union(members: Vec<TypeExpr>, nullable: bool) -> TypeExpr {
    if members.is_empty() {
        return if nullable { TypeExpr::Null } else { TypeExpr::Any };
    }
    let ty = TypeExpr::union_of(members);
    if nullable { ty.nilable() } else { ty }
}

fn enum_members(values: &[Value]) -> Vec<EnumMember> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    values
        .iter()
        .map(|value| {
            let literal = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let base = naming::enum_member_name(&literal);
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let name = if *count == 1 {
                base
            } else {
                format!("{base}{count}")
            };
            EnumMember {
                name,
                value: value.clone(),
            }
        })
        .collect()
}

/// `minLength: 1, maxLength: 50` style summary of a property's constraints.
fn constraint_comment(prop_schema: &Value) -> Option<String> {
    let entries: Vec<String> = CONSTRAINT_KEYS
        .iter()
        .filter_map(|&key| {
            let value = prop_schema.get(key)?;
            let formatted = match value {
                Value::String(s) if matches!(key, "const" | "default") => format!("\"{s}\""),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{key}: {formatted}"))
        })
        .collect();

    (!entries.is_empty()).then(|| entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(schema: Value, root: &str) -> Vec<TypeDefinition> {
        let document = SchemaDocument::from_value(schema).unwrap();
        SchemaConverter::new().convert(&document, root).unwrap()
    }

    fn names(definitions: &[TypeDefinition]) -> Vec<&str> {
        definitions.iter().map(|d| d.name.as_str()).collect()
    }

    fn field_type(definition: &TypeDefinition, field: &str) -> TypeExpr {
        definition.field(field).unwrap().ty.clone()
    }

    fn nilable(ty: TypeExpr) -> TypeExpr {
        TypeExpr::Nilable(Box::new(ty))
    }

    fn named(name: &str) -> TypeExpr {
        TypeExpr::Named(name.to_string())
    }

    #[test]
    fn single_required_string() {
        let defs = convert(
            json!({"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}),
            "Input",
        );
        assert_eq!(defs.len(), 1);
        let field = defs[0].field("name").unwrap();
        assert_eq!(defs[0].name, "Input");
        assert!(field.required);
        assert_eq!(field.ty, TypeExpr::String);
    }

    #[test]
    fn scalar_types() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "i": {"type": "integer"},
                    "f": {"type": "number"},
                    "b": {"type": "boolean"},
                    "n": {"type": "null"},
                    "t": {"type": "string", "format": "date-time"},
                    "a": {}
                },
                "required": ["i", "f", "b", "n", "t", "a"]
            }),
            "Input",
        );
        let root = &defs[0];
        assert_eq!(field_type(root, "i"), TypeExpr::Integer);
        assert_eq!(field_type(root, "f"), TypeExpr::Float);
        assert_eq!(field_type(root, "b"), TypeExpr::Boolean);
        assert_eq!(field_type(root, "n"), TypeExpr::Null);
        assert_eq!(field_type(root, "t"), TypeExpr::Timestamp);
        assert_eq!(field_type(root, "a"), TypeExpr::Any);
    }

    #[test]
    fn optional_fields_are_nilable_except_any() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "count": {"type": ["integer", "null"]},
                    "label": {"type": "string"},
                    "extra": {"type": "mystery"}
                }
            }),
            "Input",
        );
        assert_eq!(field_type(&defs[0], "count"), nilable(TypeExpr::Integer));
        assert_eq!(field_type(&defs[0], "label"), nilable(TypeExpr::String));
        assert_eq!(field_type(&defs[0], "extra"), TypeExpr::Any);
    }

    #[test]
    fn null_in_type_array_is_nilable_even_when_required() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {"count": {"type": ["integer", "null"]}},
                "required": ["count"]
            }),
            "Input",
        );
        assert_eq!(field_type(&defs[0], "count"), nilable(TypeExpr::Integer));
    }

    #[test]
    fn any_of_with_null_wraps_once() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "name": {"anyOf": [{"type": "string"}, {"type": "null"}]}
                },
                "required": []
            }),
            "Input",
        );
        assert_eq!(field_type(&defs[0], "name"), nilable(TypeExpr::String));
    }

    #[test]
    fn any_of_with_several_members_is_a_union() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "value": {"anyOf": [
                        {"type": "string"},
                        {"type": "number"},
                        {"type": "string"},
                        {"type": "null"}
                    ]},
                    "choice": {"oneOf": [{"type": "integer"}, {"type": "boolean"}]}
                },
                "required": ["value", "choice"]
            }),
            "Input",
        );
        assert_eq!(
            field_type(&defs[0], "value"),
            nilable(TypeExpr::Union(vec![TypeExpr::String, TypeExpr::Float]))
        );
        assert_eq!(
            field_type(&defs[0], "choice"),
            TypeExpr::Union(vec![TypeExpr::Integer, TypeExpr::Boolean])
        );
    }

    #[test]
    fn string_enum_becomes_a_definition() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {"role": {"type": "string", "enum": ["admin", "user"]}},
                "required": ["role"]
            }),
            "Input",
        );
        assert_eq!(names(&defs), vec!["RoleEnum", "Input"]);
        let members: Vec<_> = defs[0].members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["Admin", "User"]);
        assert_eq!(defs[0].members()[0].value, json!("admin"));
        assert_eq!(field_type(&defs[1], "role"), named("RoleEnum"));
    }

    #[test]
    fn duplicate_enum_member_names_get_suffixes() {
        let members = enum_members(&[json!("a-b"), json!("a_b"), json!("A B")]);
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["AB", "AB2", "AB3"]);
    }

    #[test]
    fn arrays_use_singular_item_names() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "meetings": {
                        "type": "array",
                        "items": {"type": "object", "properties": {"id": {"type": "integer"}}}
                    },
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "loose": {"type": "array"}
                },
                "required": ["meetings", "tags", "loose"]
            }),
            "Input",
        );
        assert_eq!(names(&defs), vec!["Meeting", "Input"]);
        let root = &defs[1];
        assert_eq!(
            field_type(root, "meetings"),
            TypeExpr::Array(Box::new(named("Meeting")))
        );
        assert_eq!(
            field_type(root, "tags"),
            TypeExpr::Array(Box::new(TypeExpr::String))
        );
        assert_eq!(
            field_type(root, "loose"),
            TypeExpr::Array(Box::new(TypeExpr::Any))
        );
    }

    #[test]
    fn tuples_become_arrays_of_unions() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "tuple_param": {
                        "type": "array",
                        "items": [{"type": "string"}, {"type": "number"}, {"type": "boolean"}],
                        "minItems": 3,
                        "maxItems": 3
                    },
                    "pair": {
                        "type": "array",
                        "prefixItems": [{"type": "integer"}, {"type": "integer"}]
                    }
                },
                "required": ["tuple_param", "pair"]
            }),
            "Input",
        );
        let field = defs[0].field("tuple_param").unwrap();
        assert_eq!(
            field.ty,
            TypeExpr::Array(Box::new(TypeExpr::Union(vec![
                TypeExpr::String,
                TypeExpr::Float,
                TypeExpr::Boolean
            ])))
        );
        assert_eq!(field.doc.as_deref(), Some("minItems: 3, maxItems: 3"));
        assert_eq!(
            field_type(&defs[0], "pair"),
            TypeExpr::Array(Box::new(TypeExpr::Integer))
        );
    }

    #[test]
    fn object_without_properties_but_typed_values_is_a_map() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "scores": {"type": "object", "additionalProperties": {"type": "number"}}
                },
                "required": ["scores"]
            }),
            "Input",
        );
        assert_eq!(names(&defs), vec!["Input"]);
        assert_eq!(
            field_type(&defs[0], "scores"),
            TypeExpr::Map(Box::new(TypeExpr::Float))
        );
    }

    #[test]
    fn constraint_comment_lists_keys_in_fixed_order() {
        let comment = constraint_comment(&json!({
            "default": "hello",
            "format": "uuid",
            "maxLength": 50,
            "minLength": 1,
            "const": "fixed_value",
            "exclusiveMinimum": 0
        }));
        assert_eq!(
            comment.as_deref(),
            Some(
                "minLength: 1, maxLength: 50, exclusiveMinimum: 0, format: uuid, \
                 const: \"fixed_value\", default: \"hello\""
            )
        );
        assert_eq!(constraint_comment(&json!({"type": "string"})), None);
        assert_eq!(
            constraint_comment(&json!({"default": 3})).as_deref(),
            Some("default: 3")
        );
    }

    #[test]
    fn identical_nested_names_share_one_definition() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "primary": {
                        "type": "object",
                        "properties": {
                            "address": {"type": "object", "properties": {"city": {"type": "string"}}}
                        }
                    },
                    "secondary": {
                        "type": "object",
                        "properties": {
                            "address": {"type": "object", "properties": {"city": {"type": "string"}}}
                        }
                    }
                }
            }),
            "Input",
        );
        let addresses = defs.iter().filter(|d| d.name == "Address").count();
        assert_eq!(addresses, 1);
        let secondary = defs.iter().find(|d| d.name == "Secondary").unwrap();
        assert_eq!(field_type(secondary, "address"), nilable(named("Address")));
    }

    #[test]
    fn strict_policy_rejects_different_shapes_under_one_name() {
        let document = SchemaDocument::from_value(json!({
            "type": "object",
            "properties": {
                "a": {"type": "object", "properties": {"item": {"type": "object", "properties": {"x": {"type": "string"}}}}},
                "b": {"type": "object", "properties": {"item": {"type": "object", "properties": {"y": {"type": "string"}}}}}
            }
        }))
        .unwrap();
        let strict = SchemaConverter::with_options(ConverterOptions {
            collisions: CollisionPolicy::Strict,
            ..ConverterOptions::default()
        });
        let err = strict.convert(&document, "Input").unwrap_err();
        assert!(matches!(err, ConversionError::NameCollision { ref name } if name == "Item"));

        let lenient = SchemaConverter::new().convert(&document, "Input").unwrap();
        assert_eq!(lenient.iter().filter(|d| d.name == "Item").count(), 1);
    }

    #[test]
    fn dependencies_precede_dependents() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "report": {
                        "type": "object",
                        "properties": {
                            "employee": {"type": "object", "properties": {"id": {"type": "string"}}},
                            "meeting": {"type": "object", "properties": {"id": {"type": "integer"}}}
                        }
                    }
                }
            }),
            "Input",
        );
        let order = names(&defs);
        let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(position("Employee") < position("Report"));
        assert!(position("Meeting") < position("Report"));
        assert_eq!(order.last(), Some(&"Input"));
    }

    #[test]
    fn self_reference_terminates() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {
                    "node": {
                        "type": "object",
                        "properties": {
                            "value": {"type": "integer"},
                            "node": {"$ref": "#/properties/node"}
                        }
                    }
                }
            }),
            "Tree",
        );
        assert_eq!(names(&defs), vec!["Node", "Tree"]);
        assert_eq!(field_type(&defs[0], "node"), nilable(named("Node")));
    }

    #[test]
    fn root_names_avoid_prelude_types() {
        let schema = json!({"type": "object", "properties": {"id": {"type": "string"}}});
        assert_eq!(convert(schema.clone(), "string").last().unwrap().name, "StringType");
        assert_eq!(convert(schema.clone(), "option").last().unwrap().name, "OptionType");
        assert_eq!(convert(schema.clone(), "weekly report").last().unwrap().name, "WeeklyReport");
        assert_eq!(convert(schema, "--").last().unwrap().name, "Root");
    }

    #[test]
    fn unresolved_ref_is_untyped() {
        let defs = convert(
            json!({
                "type": "object",
                "properties": {"ghost": {"$ref": "#/properties/nowhere"}},
                "required": ["ghost"]
            }),
            "Input",
        );
        assert_eq!(field_type(&defs[0], "ghost"), TypeExpr::Any);
    }

    #[test]
    fn root_ref_into_definitions() {
        let defs = convert(
            json!({
                "$ref": "#/definitions/Payload",
                "definitions": {
                    "Payload": {
                        "type": "object",
                        "properties": {"id": {"type": "string"}},
                        "required": ["id"]
                    }
                }
            }),
            "Payload",
        );
        assert_eq!(field_type(&defs[0], "id"), TypeExpr::String);
    }

    #[test]
    fn depth_guard_fails_closed() {
        let mut schema = json!({"type": "string"});
        for _ in 0..20 {
            schema = json!({"type": "object", "properties": {"inner": schema}});
        }
        let document = SchemaDocument::from_value(schema).unwrap();
        let converter = SchemaConverter::with_options(ConverterOptions {
            max_depth: 10,
            ..ConverterOptions::default()
        });
        let err = converter.convert(&document, "Input").unwrap_err();
        assert!(matches!(err, ConversionError::RecursionLimit { limit: 10 }));
    }

    #[test]
    fn mutually_recursive_unions_hit_the_depth_guard() {
        let document = SchemaDocument::from_value(json!({
            "type": "object",
            "properties": {"loop": {"$ref": "#/$defs/A"}},
            "$defs": {
                "A": {"anyOf": [{"$ref": "#/$defs/B"}, {"type": "null"}]},
                "B": {"anyOf": [{"$ref": "#/$defs/A"}, {"type": "string"}]}
            }
        }))
        .unwrap();
        let err = SchemaConverter::new().convert(&document, "Input").unwrap_err();
        assert!(matches!(err, ConversionError::RecursionLimit { .. }));
    }

    #[test]
    fn conversion_is_deterministic() {
        let schema = json!({
            "type": "object",
            "properties": {
                "b": {"type": "object", "properties": {"z": {"type": "string", "enum": ["x"]}}},
                "a": {"type": "array", "items": {"type": "object", "properties": {"q": {}}}}
            }
        });
        assert_eq!(convert(schema.clone(), "Input"), convert(schema, "Input"));
    }
}
