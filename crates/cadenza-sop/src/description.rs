use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cadenza_core::{CadenzaError, Result};

/// The declarative SOP description — the wire contract.
///
/// Field names and nesting are what external tooling (description editors
/// and generators) depends on; they must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopDescription {
    /// Sampling temperature the host passes to the model.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Whether the agent may speak without being prompted.
    #[serde(default)]
    pub active_mode: bool,

    /// Directory the logging collaborator writes to.
    #[serde(default = "default_log_path")]
    pub log_path: String,

    /// Node name → node spec.
    pub nodes: HashMap<String, NodeSpec>,

    /// Source node name → transition keyword → target node name.
    pub relation: HashMap<String, HashMap<String, String>>,
}

/// One declared node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node name; this, not the map key, registers the node.
    pub name: String,

    /// Whether the node waits for user input.
    #[serde(default)]
    pub is_interactive: bool,

    /// Role name → component tag → component args.
    pub agent_states: HashMap<String, HashMap<String, Value>>,

    /// Render order of component categories; order is semantically
    /// significant.
    pub config: Vec<String>,

    /// Opaque metadata for the external transition-decision procedure.
    #[serde(default)]
    pub controller: Value,

    /// Marks the graph root. At most one node may set this.
    #[serde(default)]
    pub root: bool,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_log_path() -> String {
    "logs".to_string()
}

impl SopDescription {
    /// Load a description from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| CadenzaError::DescriptionNotFound(path.display().to_string()))?;
        Self::from_str(&content)
    }

    /// Parse a description from JSON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CadenzaError::MalformedDescription(e.to_string()))
    }
}
