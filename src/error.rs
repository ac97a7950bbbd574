use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Invalid JSON schema provided: {0}")]
    ParseError(String),

    #[error("Schema nesting exceeds the maximum depth of {limit}")]
    RecursionLimit { limit: usize },

    #[error("Type name `{name}` was synthesized for two different schemas")]
    NameCollision { name: String },

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error(
        "Map field `{field}` is not supported: structured output requires closed object schemas \
         (enable allow_maps to emit additionalProperties maps anyway)"
    )]
    MapNotAllowed { field: String },

    #[error("Unsupported map key type: {0} (keys must be strings)")]
    UnsupportedMapKey(String),

    #[error("Expected a struct description, got {0}")]
    NotAStruct(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Workflow name must be a valid identifier: {0:?}")]
    InvalidWorkflowName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
