use serde_json::{Map, Value};

use cadenza_core::{ArgsMap, Result};

/// A component that renders a prompt fragment.
///
/// The same trait backs system-prompt and last-prompt producers; which of the
/// two a renderer feeds is decided by the `Component` variant wrapping it.
pub trait PromptRenderer: Send + Sync {
    /// Component name, used in error reporting.
    fn name(&self) -> &str;

    /// Render one prompt fragment from the current compile context.
    fn render(&self, args: &ArgsMap) -> Result<String>;
}

/// A component that performs a lookup or side effect and returns a mapping.
///
/// Returned entries are merged into the compile context for downstream
/// components and accumulated into the caller-visible tool results.
pub trait ToolComponent: Send + Sync {
    /// Component name, used in error reporting.
    fn name(&self) -> &str;

    /// Run the tool against the current compile context.
    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>>;
}

/// A live component, tagged with the one capability it carries.
///
/// Prompt compilation dispatches on this enum — never on a component's
/// concrete kind — so new kinds plug in without touching the compile loop.
pub enum Component {
    /// Appends its rendered text to the system prompt.
    SystemPrompt(Box<dyn PromptRenderer>),
    /// Appends its rendered text to the last (user-turn) prompt.
    LastPrompt(Box<dyn PromptRenderer>),
    /// Invoked for its result mapping.
    Tool(Box<dyn ToolComponent>),
}

impl Component {
    /// Wrap a renderer as a system-prompt producer.
    pub fn system(renderer: impl PromptRenderer + 'static) -> Self {
        Self::SystemPrompt(Box::new(renderer))
    }

    /// Wrap a renderer as a last-prompt producer.
    pub fn last(renderer: impl PromptRenderer + 'static) -> Self {
        Self::LastPrompt(Box::new(renderer))
    }

    /// Wrap a tool.
    pub fn tool(tool: impl ToolComponent + 'static) -> Self {
        Self::Tool(Box::new(tool))
    }

    /// The capability this component carries, for logging and introspection.
    pub fn capability(&self) -> Capability {
        match self {
            Component::SystemPrompt(_) => Capability::SystemPrompt,
            Component::LastPrompt(_) => Capability::LastPrompt,
            Component::Tool(_) => Capability::Tool,
        }
    }

    /// The wrapped component's name.
    pub fn name(&self) -> &str {
        match self {
            Component::SystemPrompt(r) | Component::LastPrompt(r) => r.name(),
            Component::Tool(t) => t.name(),
        }
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component::{:?}({})", self.capability(), self.name())
    }
}

/// The three component capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SystemPrompt,
    LastPrompt,
    Tool,
}
