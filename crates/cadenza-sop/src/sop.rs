use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use cadenza_components::ComponentRegistry;
use cadenza_core::{CadenzaError, RelationEnd, Result};

use crate::description::{NodeSpec, SopDescription};
use crate::node::{AgentState, Node};

/// A standard operating procedure: the executable workflow graph.
///
/// Owns every node (keyed by name), the optional root, the description-level
/// settings, and the per-node controller metadata consumed by the external
/// transition-decision procedure. Transition edges inside nodes are name
/// handles into this table.
#[derive(Debug)]
pub struct Sop {
    nodes: HashMap<String, Node>,
    root: Option<String>,
    temperature: f32,
    active_mode: bool,
    log_path: String,
    controllers: HashMap<String, Value>,
}

impl Sop {
    /// Load a description file and build the graph from it.
    pub fn load(path: &Path, registry: &ComponentRegistry) -> Result<Self> {
        let description = SopDescription::load(path)?;
        Self::from_description(&description, registry)
    }

    /// Build a graph from a parsed description.
    ///
    /// Two passes: the node pass creates every node and its agent states,
    /// the relation pass wires transitions by name. Wiring must follow full
    /// node creation because every relation endpoint must already exist.
    /// The description is read once and never mutated.
    pub fn from_description(
        description: &SopDescription,
        registry: &ComponentRegistry,
    ) -> Result<Self> {
        let mut sop = Self {
            nodes: HashMap::new(),
            root: None,
            temperature: description.temperature,
            active_mode: description.active_mode,
            log_path: description.log_path.clone(),
            controllers: HashMap::new(),
        };

        // Node pass
        for spec in description.nodes.values() {
            sop.add_node(spec, registry)?;
        }

        // Relation pass
        for (source, transitions) in &description.relation {
            let Some(node) = sop.nodes.get_mut(source) else {
                return Err(CadenzaError::UnknownNode {
                    node: source.clone(),
                    end: RelationEnd::Source,
                });
            };
            for (keyword, target) in transitions {
                node.add_transition(keyword.clone(), target.clone());
            }
        }

        // Transitions are name handles; every one must resolve in the table
        for node in sop.nodes.values() {
            for target in node.next_nodes().values() {
                if !sop.nodes.contains_key(target) {
                    return Err(CadenzaError::UnknownNode {
                        node: target.clone(),
                        end: RelationEnd::Target,
                    });
                }
            }
        }

        info!(
            nodes = sop.nodes.len(),
            root = sop.root.as_deref().unwrap_or("<none>"),
            "Built SOP graph"
        );
        Ok(sop)
    }

    fn add_node(&mut self, spec: &NodeSpec, registry: &ComponentRegistry) -> Result<()> {
        if self.nodes.contains_key(&spec.name) {
            return Err(CadenzaError::DuplicateNode(spec.name.clone()));
        }

        let mut agent_states = HashMap::new();
        for (role, components) in &spec.agent_states {
            let mut state = AgentState::new();
            for (tag, args) in components {
                state.insert(tag.clone(), registry.build(tag, args)?);
            }

            // Config entries must resolve in every role's state
            for category in &spec.config {
                if !state.contains_key(category) {
                    return Err(CadenzaError::CategoryNotConfigured {
                        node: spec.name.clone(),
                        role: role.clone(),
                        category: category.clone(),
                    });
                }
            }
            agent_states.insert(role.clone(), state);
        }

        if spec.root {
            if let Some(first) = &self.root {
                return Err(CadenzaError::DuplicateRoot {
                    first: first.clone(),
                    second: spec.name.clone(),
                });
            }
            self.root = Some(spec.name.clone());
        }

        self.controllers
            .insert(spec.name.clone(), spec.controller.clone());

        debug!(node = %spec.name, roles = spec.agent_states.len(), "Created node");
        self.nodes.insert(
            spec.name.clone(),
            Node::new(
                spec.name.clone(),
                spec.is_interactive,
                spec.config.clone(),
                agent_states,
            ),
        );
        Ok(())
    }

    /// A node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// The root node, if the description declared one.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref().and_then(|name| self.nodes.get(name))
    }

    /// Resolve a transition: the node reached from `from` via `keyword`.
    pub fn follow(&self, from: &str, keyword: &str) -> Option<&Node> {
        let target = self.nodes.get(from)?.next(keyword)?;
        self.nodes.get(target)
    }

    /// Controller metadata for a node.
    pub fn controller(&self, node: &str) -> Option<&Value> {
        self.controllers.get(node)
    }

    /// All node names, sorted.
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn active_mode(&self) -> bool {
        self.active_mode
    }

    pub fn log_path(&self) -> &str {
        &self.log_path
    }
}
