//! Prompt-producing components.
//!
//! Each component parses its own args shape from the description and renders
//! one fragment per compile. All rendered text passes through `{placeholder}`
//! filling from the compile context, so fragments can reference values that
//! tool components placed earlier in the config ordering.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use cadenza_core::{ArgsMap, CadenzaError, Result};

use crate::component::PromptRenderer;
use crate::template::fill_template;

fn parse_args<T: DeserializeOwned>(component: &str, args: &Value) -> Result<T> {
    serde_json::from_value(args.clone()).map_err(|e| CadenzaError::ComponentArgs {
        component: component.to_string(),
        message: e.to_string(),
    })
}

/// Persona and speaking style for the role occupying a node.
pub struct StyleComponent {
    role: Option<String>,
    style: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StyleArgs {
    Text(String),
    Full {
        #[serde(default)]
        role: Option<String>,
        style: String,
    },
}

impl StyleComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: StyleArgs = parse_args("style", args)?;
        Ok(match parsed {
            StyleArgs::Text(style) => Self { role: None, style },
            StyleArgs::Full { role, style } => Self { role, style },
        })
    }
}

impl PromptRenderer for StyleComponent {
    fn name(&self) -> &str {
        "style"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        let style = fill_template(&self.style, args);
        Ok(match &self.role {
            Some(role) => format!("You are {}. {}", fill_template(role, args), style),
            None => style,
        })
    }
}

/// What the role must accomplish in this node.
#[derive(Debug)]
pub struct TaskComponent {
    task: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskArgs {
    Text(String),
    Wrapped { task: String },
}

impl TaskComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: TaskArgs = parse_args("task", args)?;
        Ok(Self {
            task: match parsed {
                TaskArgs::Text(t) | TaskArgs::Wrapped { task: t } => t,
            },
        })
    }
}

impl PromptRenderer for TaskComponent {
    fn name(&self) -> &str {
        "task"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        Ok(format!("task:{}", fill_template(&self.task, args)))
    }
}

/// A rule the role must obey.
pub struct RuleComponent {
    rule: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleArgs {
    Text(String),
    Wrapped { rule: String },
}

impl RuleComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: RuleArgs = parse_args("rule", args)?;
        Ok(Self {
            rule: match parsed {
                RuleArgs::Text(r) | RuleArgs::Wrapped { rule: r } => r,
            },
        })
    }
}

impl PromptRenderer for RuleComponent {
    fn name(&self) -> &str {
        "rule"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        Ok(format!("rule:{}", fill_template(&self.rule, args)))
    }
}

/// Worked examples shown to the model.
pub struct DemonstrationComponent {
    demonstrations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DemonstrationArgs {
    List(Vec<String>),
    Wrapped { demonstrations: Vec<String> },
}

impl DemonstrationComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: DemonstrationArgs = parse_args("demonstration", args)?;
        Ok(Self {
            demonstrations: match parsed {
                DemonstrationArgs::List(d) | DemonstrationArgs::Wrapped { demonstrations: d } => d,
            },
        })
    }
}

impl PromptRenderer for DemonstrationComponent {
    fn name(&self) -> &str {
        "demonstration"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        let mut out = String::from("Here are some examples:");
        for demonstration in &self.demonstrations {
            out.push('\n');
            out.push_str(&fill_template(demonstration, args));
        }
        Ok(out)
    }
}

/// Chain-of-thought instruction.
pub struct CotComponent {
    instruction: String,
}

const DEFAULT_COT: &str = "Before answering, reason step by step.";

#[derive(Deserialize)]
#[serde(untagged)]
enum CotArgs {
    Text(String),
    Wrapped {
        #[serde(default)]
        instruction: Option<String>,
    },
}

impl CotComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        if args.is_null() {
            return Ok(Self {
                instruction: DEFAULT_COT.to_string(),
            });
        }
        let parsed: CotArgs = parse_args("cot", args)?;
        Ok(Self {
            instruction: match parsed {
                CotArgs::Text(t) => t,
                CotArgs::Wrapped { instruction } => {
                    instruction.unwrap_or_else(|| DEFAULT_COT.to_string())
                }
            },
        })
    }
}

impl PromptRenderer for CotComponent {
    fn name(&self) -> &str {
        "cot"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        Ok(fill_template(&self.instruction, args))
    }
}

/// Output-format instruction, rendered into the last prompt.
///
/// Instructs the model to wrap its answer in `<format>` tags, which is the
/// shape the extract tool scans for.
pub struct OutputComponent {
    format: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutputArgs {
    Text(String),
    Format { format: String },
    Legacy { output: String },
}

impl OutputComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: OutputArgs = parse_args("output", args)?;
        Ok(Self {
            format: match parsed {
                OutputArgs::Text(f) | OutputArgs::Format { format: f } => f,
                OutputArgs::Legacy { output: f } => f,
            },
        })
    }
}

impl PromptRenderer for OutputComponent {
    fn name(&self) -> &str {
        "output"
    }

    fn render(&self, args: &ArgsMap) -> Result<String> {
        let format = fill_template(&self.format, args);
        Ok(format!(
            "Wrap the {format} you produce between <{format}> and </{format}>."
        ))
    }
}
