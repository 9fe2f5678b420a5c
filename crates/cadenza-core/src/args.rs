use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mutable argument context for one prompt compilation.
///
/// Every component in a compile pass reads from the same ArgsMap; tool
/// components also write into it, which is how values produced early in the
/// config ordering become visible to components rendered later. Each compile
/// invocation must receive its own instance — the map carries no locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgsMap {
    data: HashMap<String, serde_json::Value>,
}

impl ArgsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ArgsMap from initial data.
    pub fn from_map(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a value as a string, if it's a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Set a value.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Set a string value.
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data
            .insert(key.into(), serde_json::Value::String(value.into()));
    }

    /// Merge a tool result mapping into this context (overwrites on conflict).
    pub fn merge(&mut self, other: &serde_json::Map<String, serde_json::Value>) {
        for (k, v) in other {
            self.data.insert(k.clone(), v.clone());
        }
    }

    /// Get the underlying data map.
    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }
}

/// Output of compiling one node for one role.
#[derive(Debug, Clone, Default)]
pub struct CompiledPrompt {
    /// Accumulated system-prompt text, fragments in config order.
    pub system_prompt: String,
    /// Accumulated last-prompt (user turn) text, fragments in config order.
    pub last_prompt: String,
    /// Everything the tool components returned, merged in config order.
    pub tool_results: serde_json::Map<String, serde_json::Value>,
}
