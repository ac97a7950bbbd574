//! Where workflow schemas come from.

use crate::converter::{ConverterOptions, SchemaConverter};
use crate::error::{ConversionError, Result};
use crate::types::TypeDefinition;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Schema text of one workflow, in any envelope form the converter accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSchemas {
    pub input_schema: String,
    pub output_schema: Option<String>,
}

/// A provider of workflow schemas, looked up by workflow name.
pub trait SchemaSource {
    fn workflow_names(&self) -> Result<Vec<String>>;
    fn workflow(&self, name: &str) -> Result<WorkflowSchemas>;
}

/// Workflow schemas read from a JSON catalog shaped like a workflow listing:
///
/// ```json
/// {
///   "testWorkflow": {
///     "input_schema": "{\"json\": {\"type\": \"object\"}}",
///     "output_schema": {"type": "object"}
///   }
/// }
/// ```
///
/// Schemas may be given as JSON text or inline as objects.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    workflows: IndexMap<String, WorkflowSchemas>,
}

impl CatalogSource {
    pub fn new(workflows: impl IntoIterator<Item = (String, WorkflowSchemas)>) -> Self {
        Self {
            workflows: workflows.into_iter().collect(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading schema catalog");
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: IndexMap<String, Value> = serde_json::from_str(text)
            .map_err(|e| ConversionError::ParseError(format!("schema catalog: {e}")))?;

        let mut workflows = IndexMap::with_capacity(catalog.len());
        for (name, entry) in catalog {
            let input_schema = entry
                .get("input_schema")
                .and_then(schema_text)
                .ok_or_else(|| {
                    ConversionError::ParseError(format!("workflow `{name}` has no input_schema"))
                })?;
            let output_schema = entry.get("output_schema").and_then(schema_text);
            workflows.insert(
                name,
                WorkflowSchemas {
                    input_schema,
                    output_schema,
                },
            );
        }

        Ok(Self { workflows })
    }
}

impl SchemaSource for CatalogSource {
    fn workflow_names(&self) -> Result<Vec<String>> {
        Ok(self
            .workflows
            .keys()
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .collect())
    }

    fn workflow(&self, name: &str) -> Result<WorkflowSchemas> {
        self.workflows
            .get(name)
            .cloned()
            .ok_or_else(|| ConversionError::WorkflowNotFound(name.to_string()))
    }
}

fn schema_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Workflow names become module names, so they must be identifiers:
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_workflow_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ConversionError::InvalidWorkflowName(name.to_string()))
    }
}

/// Generated types for one workflow's input and output.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTypes {
    pub name: String,
    /// Ends with the `Input` record.
    pub input: Vec<TypeDefinition>,
    /// Ends with the `Output` record; empty when the workflow has no output schema.
    pub output: Vec<TypeDefinition>,
}

pub fn generate_workflow_types(
    source: &dyn SchemaSource,
    name: &str,
    options: &ConverterOptions,
) -> Result<WorkflowTypes> {
    validate_workflow_name(name)?;
    let schemas = source.workflow(name)?;
    let converter = SchemaConverter::with_options(options.clone());

    let input = converter.convert_str(&schemas.input_schema, "Input")?;
    let output = match &schemas.output_schema {
        Some(text) => converter.convert_str(text, "Output")?,
        None => Vec::new(),
    };

    Ok(WorkflowTypes {
        name: name.to_string(),
        input,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "testWorkflow": {
            "input_schema": "{\"json\": {\"type\": \"object\", \"properties\": {\"query\": {\"type\": \"string\"}}, \"required\": [\"query\"]}}",
            "output_schema": {"type": "object", "properties": {"answer": {"type": "string"}}}
        },
        "inputOnly": {
            "input_schema": {"type": "object", "properties": {}},
            "output_schema": null
        }
    }"#;

    #[test]
    fn lists_workflows_in_catalog_order() {
        let source = CatalogSource::from_json(CATALOG).unwrap();
        assert_eq!(source.workflow_names().unwrap(), vec!["testWorkflow", "inputOnly"]);
    }

    #[test]
    fn accepts_text_and_inline_schemas() {
        let source = CatalogSource::from_json(CATALOG).unwrap();
        let schemas = source.workflow("testWorkflow").unwrap();
        assert!(schemas.input_schema.starts_with("{\"json\""));
        let output: Value = serde_json::from_str(schemas.output_schema.as_deref().unwrap()).unwrap();
        assert_eq!(output["properties"]["answer"]["type"], "string");
    }

    #[test]
    fn missing_input_schema_is_an_error() {
        let err = CatalogSource::from_json(r#"{"broken": {"output_schema": "{}"}}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ParseError(ref msg) if msg.contains("broken")));
    }

    #[test]
    fn generates_input_and_output_types() {
        let source = CatalogSource::from_json(CATALOG).unwrap();
        let types =
            generate_workflow_types(&source, "testWorkflow", &ConverterOptions::default()).unwrap();

        let input = types.input.last().unwrap();
        assert_eq!(input.name, "Input");
        assert!(input.field("query").unwrap().required);
        assert_eq!(types.output.last().unwrap().name, "Output");
    }

    #[test]
    fn output_is_optional() {
        let source = CatalogSource::from_json(CATALOG).unwrap();
        let types =
            generate_workflow_types(&source, "inputOnly", &ConverterOptions::default()).unwrap();
        assert_eq!(types.input.len(), 1);
        assert!(types.output.is_empty());
    }

    #[test]
    fn unknown_workflows_are_reported() {
        let source = CatalogSource::default();
        let err = generate_workflow_types(&source, "missing", &ConverterOptions::default()).unwrap_err();
        assert!(matches!(err, ConversionError::WorkflowNotFound(ref name) if name == "missing"));
    }

    #[test]
    fn validates_workflow_names() {
        assert!(validate_workflow_name("testWorkflow").is_ok());
        assert!(validate_workflow_name("_private_2").is_ok());
        for bad in ["", "2fast", "has-dash", "with space", "dotted.name"] {
            assert!(
                matches!(validate_workflow_name(bad), Err(ConversionError::InvalidWorkflowName(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
