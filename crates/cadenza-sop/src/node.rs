use std::collections::HashMap;

use tracing::debug;

use cadenza_components::Component;
use cadenza_core::{ArgsMap, CadenzaError, CompiledPrompt, Result};

/// The live components for one (node, role) pair, keyed by category.
///
/// The category key is the component tag exactly as written in the
/// description; `config` entries resolve against these keys.
pub type AgentState = HashMap<String, Component>;

/// A state in the agent workflow graph.
///
/// A node holds, per role, the components that assemble its prompt, the
/// order in which they render, and the outgoing transitions. Transition
/// targets are node *names* — handles into the graph-owned table — so nodes
/// never own or alias each other.
pub struct Node {
    name: String,
    is_interactive: bool,
    config: Vec<String>,
    agent_states: HashMap<String, AgentState>,
    next_nodes: HashMap<String, String>,
}

impl Node {
    pub(crate) fn new(
        name: String,
        is_interactive: bool,
        config: Vec<String>,
        agent_states: HashMap<String, AgentState>,
    ) -> Self {
        Self {
            name,
            is_interactive,
            config,
            agent_states,
            next_nodes: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    /// The declared render order of component categories.
    pub fn config(&self) -> &[String] {
        &self.config
    }

    /// Roles defined for this node.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.agent_states.keys().map(|s| s.as_str())
    }

    /// The component state for one role.
    pub fn agent_state(&self, role: &str) -> Option<&AgentState> {
        self.agent_states.get(role)
    }

    /// Outgoing transitions: keyword → target node name.
    pub fn next_nodes(&self) -> &HashMap<String, String> {
        &self.next_nodes
    }

    /// The target node name for a transition keyword.
    pub fn next(&self, keyword: &str) -> Option<&str> {
        self.next_nodes.get(keyword).map(|s| s.as_str())
    }

    pub(crate) fn add_transition(&mut self, keyword: String, target: String) {
        self.next_nodes.insert(keyword, target);
    }

    /// Assemble the prompt for one role.
    ///
    /// Walks `config` in declared order, dispatching each component on its
    /// capability: prompt producers append to the system or last prompt
    /// (every fragment preceded by a `\n` separator), tools run and have
    /// their results merged into both `args` and the returned tool results.
    /// Order matters — a later component observes everything earlier tools
    /// wrote into `args`. Any component failure aborts the compilation; no
    /// partial result is returned.
    pub fn compile(&self, role: &str, args: &mut ArgsMap) -> Result<CompiledPrompt> {
        let state = self
            .agent_states
            .get(role)
            .ok_or_else(|| CadenzaError::RoleNotDefined {
                node: self.name.clone(),
                role: role.to_string(),
            })?;

        let mut compiled = CompiledPrompt::default();
        for category in &self.config {
            let component =
                state
                    .get(category)
                    .ok_or_else(|| CadenzaError::CategoryNotConfigured {
                        node: self.name.clone(),
                        role: role.to_string(),
                        category: category.clone(),
                    })?;

            match component {
                Component::SystemPrompt(renderer) => {
                    compiled.system_prompt.push('\n');
                    compiled.system_prompt.push_str(&renderer.render(args)?);
                }
                Component::LastPrompt(renderer) => {
                    compiled.last_prompt.push('\n');
                    compiled.last_prompt.push_str(&renderer.render(args)?);
                }
                Component::Tool(tool) => {
                    let result = tool.call(args)?;
                    args.merge(&result);
                    compiled.tool_results.extend(result);
                }
            }
        }

        debug!(
            node = %self.name,
            role,
            system_len = compiled.system_prompt.len(),
            last_len = compiled.last_prompt.len(),
            tool_keys = compiled.tool_results.len(),
            "Compiled node"
        );
        Ok(compiled)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("is_interactive", &self.is_interactive)
            .field("config", &self.config)
            .field("roles", &self.agent_states.keys().collect::<Vec<_>>())
            .field("next_nodes", &self.next_nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    use cadenza_components::{PromptRenderer, ToolComponent};

    struct Fixed(&'static str, &'static str);

    impl PromptRenderer for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn render(&self, _args: &ArgsMap) -> Result<String> {
            Ok(self.1.to_string())
        }
    }

    struct SeedTool;

    impl ToolComponent for SeedTool {
        fn name(&self) -> &str {
            "seed"
        }
        fn call(&self, _args: &ArgsMap) -> Result<Map<String, Value>> {
            let mut out = Map::new();
            out.insert("seed".into(), Value::String("planted".into()));
            Ok(out)
        }
    }

    struct ReadsSeed;

    impl PromptRenderer for ReadsSeed {
        fn name(&self) -> &str {
            "reads-seed"
        }
        fn render(&self, args: &ArgsMap) -> Result<String> {
            Ok(args.get_str("seed").unwrap_or("missing").to_string())
        }
    }

    struct FailingTool;

    impl ToolComponent for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }
        fn call(&self, _args: &ArgsMap) -> Result<Map<String, Value>> {
            Err(CadenzaError::ToolExecution {
                tool: "failing".into(),
                message: "backend unavailable".into(),
            })
        }
    }

    fn node(config: Vec<&str>, state: AgentState) -> Node {
        let mut states = HashMap::new();
        states.insert("r".to_string(), state);
        Node::new(
            "n".to_string(),
            false,
            config.into_iter().map(String::from).collect(),
            states,
        )
    }

    #[test]
    fn test_fragments_concatenate_in_config_order() {
        let mut state = AgentState::new();
        state.insert("style".into(), Component::system(Fixed("style", "be concise")));
        state.insert("task".into(), Component::system(Fixed("task", "task:summarize")));

        let node = node(vec!["style", "task"], state);
        let compiled = node.compile("r", &mut ArgsMap::new()).unwrap();
        assert_eq!(compiled.system_prompt, "\nbe concise\ntask:summarize");
        assert_eq!(compiled.last_prompt, "");
    }

    #[test]
    fn test_swapping_config_swaps_order() {
        let build_state = || {
            let mut state = AgentState::new();
            state.insert("a".into(), Component::system(Fixed("a", "first")));
            state.insert("b".into(), Component::system(Fixed("b", "second")));
            state
        };

        let forward = node(vec!["a", "b"], build_state());
        let backward = node(vec!["b", "a"], build_state());

        assert_eq!(
            forward.compile("r", &mut ArgsMap::new()).unwrap().system_prompt,
            "\nfirst\nsecond"
        );
        assert_eq!(
            backward.compile("r", &mut ArgsMap::new()).unwrap().system_prompt,
            "\nsecond\nfirst"
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let mut state = AgentState::new();
        state.insert("style".into(), Component::system(Fixed("style", "x")));
        state.insert("output".into(), Component::last(Fixed("output", "y")));
        let node = node(vec!["style", "output"], state);

        let first = node.compile("r", &mut ArgsMap::new()).unwrap();
        let second = node.compile("r", &mut ArgsMap::new()).unwrap();
        assert_eq!(first.system_prompt, second.system_prompt);
        assert_eq!(first.last_prompt, second.last_prompt);
    }

    #[test]
    fn test_tool_output_visible_downstream() {
        let mut state = AgentState::new();
        state.insert("seed".into(), Component::tool(SeedTool));
        state.insert("reader".into(), Component::system(ReadsSeed));

        let node = node(vec!["seed", "reader"], state);
        let mut args = ArgsMap::new();
        let compiled = node.compile("r", &mut args).unwrap();

        assert_eq!(compiled.system_prompt, "\nplanted");
        assert_eq!(compiled.tool_results.get("seed").unwrap(), "planted");
        assert_eq!(args.get_str("seed"), Some("planted"));
    }

    #[test]
    fn test_tool_after_renderer_cannot_rewrite_fragment() {
        let mut state = AgentState::new();
        state.insert("reader".into(), Component::system(ReadsSeed));
        state.insert("seed".into(), Component::tool(SeedTool));

        let node = node(vec!["reader", "seed"], state);
        let compiled = node.compile("r", &mut ArgsMap::new()).unwrap();

        // The renderer ran before the tool produced the value
        assert_eq!(compiled.system_prompt, "\nmissing");
        assert_eq!(compiled.tool_results.get("seed").unwrap(), "planted");
    }

    #[test]
    fn test_undefined_role_rejected() {
        let node = node(vec![], AgentState::new());
        let err = node.compile("ghost", &mut ArgsMap::new()).unwrap_err();
        assert!(matches!(err, CadenzaError::RoleNotDefined { role, .. } if role == "ghost"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut state = AgentState::new();
        state.insert("style".into(), Component::system(Fixed("style", "x")));

        let node = node(vec!["style", "missing"], state);
        let err = node.compile("r", &mut ArgsMap::new()).unwrap_err();
        assert!(
            matches!(err, CadenzaError::CategoryNotConfigured { category, .. } if category == "missing")
        );
    }

    #[test]
    fn test_tool_failure_aborts_whole_compile() {
        let mut state = AgentState::new();
        state.insert("style".into(), Component::system(Fixed("style", "x")));
        state.insert("failing".into(), Component::tool(FailingTool));

        let node = node(vec!["style", "failing"], state);
        let err = node.compile("r", &mut ArgsMap::new()).unwrap_err();
        assert!(matches!(err, CadenzaError::ToolExecution { .. }));
    }
}
