use thiserror::Error;

#[derive(Debug, Error)]
pub enum CadenzaError {
    // Description errors
    #[error("Malformed description: {0}")]
    MalformedDescription(String),

    #[error("Description file not found: {0}")]
    DescriptionNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("More than one root node: '{first}' and '{second}'")]
    DuplicateRoot { first: String, second: String },

    #[error("Relation references unknown node '{node}' ({end})")]
    UnknownNode { node: String, end: RelationEnd },

    // Factory errors
    #[error("Unknown component kind: {0}")]
    UnknownComponentKind(String),

    #[error("Invalid args for component '{component}': {message}")]
    ComponentArgs { component: String, message: String },

    // Compile errors
    #[error("Role '{role}' is not defined for node '{node}'")]
    RoleNotDefined { node: String, role: String },

    #[error("Config entry '{category}' has no component in role '{role}' of node '{node}'")]
    CategoryNotConfigured {
        node: String,
        role: String,
        category: String,
    },

    #[error("Component '{component}' failed to render: {message}")]
    Render { component: String, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which end of a relation triple referenced a missing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEnd {
    Source,
    Target,
}

impl std::fmt::Display for RelationEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationEnd::Source => write!(f, "source"),
            RelationEnd::Target => write!(f, "target"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CadenzaError>;
