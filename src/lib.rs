pub mod converter;
pub mod describe;
pub mod error;
pub mod graph;
pub mod naming;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod struct_schema;
pub mod types;

pub use converter::{CollisionPolicy, ConverterOptions, SchemaConverter};
pub use describe::{
    Deferred, Describe, EnumDescription, FieldDescription, FieldType, StructDescription,
};
pub use error::{ConversionError, Result};
pub use graph::DependencyGraph;
pub use render::{RenderOptions, render_definitions, render_workflow};
pub use resolver::RefResolver;
pub use schema::SchemaDocument;
pub use source::{
    CatalogSource, SchemaSource, WorkflowSchemas, WorkflowTypes, generate_workflow_types,
};
pub use struct_schema::{StructSchemaConverter, StructSchemaOptions, schema_for};
pub use types::{DefinitionKind, EnumMember, Field, TypeDefinition, TypeExpr};

/// Root type name used when none is given.
pub const DEFAULT_ROOT_NAME: &str = "Input";

/// Convert a JSON Schema string to type definitions rooted at `Input`
pub fn generate_definitions(json_schema: &str) -> Result<Vec<TypeDefinition>> {
    SchemaConverter::new().convert_str(json_schema, DEFAULT_ROOT_NAME)
}

/// Convert a JSON Schema string to Rust source
pub fn convert_schema(json_schema: &str) -> Result<String> {
    convert_schema_with_name(json_schema, DEFAULT_ROOT_NAME)
}

/// Convert a JSON Schema string to Rust source with a custom root type name
pub fn convert_schema_with_name(json_schema: &str, type_name: &str) -> Result<String> {
    let definitions = SchemaConverter::new().convert_str(json_schema, type_name)?;
    Ok(render_definitions(&definitions, &RenderOptions::default()))
}

/// Convert a struct description to a closed JSON Schema
pub fn struct_to_schema(description: &StructDescription) -> Result<serde_json::Value> {
    StructSchemaConverter::new().convert(description)
}
