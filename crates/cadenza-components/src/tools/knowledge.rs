use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use cadenza_core::{ArgsMap, CadenzaError, Result};

use crate::component::ToolComponent;

/// Retrieves the top-k knowledge-base entries matching the current query.
///
/// The knowledge base is a JSON array of entries, loaded eagerly when the
/// component is built. Scoring is lexical token overlap; semantic retrieval
/// belongs to the model-invocation layer outside this engine.
#[derive(Debug)]
pub struct KnowledgeBaseComponent {
    top_k: usize,
    qa_mode: bool,
    entries: Vec<KnowledgeEntry>,
    system_prompt: String,
    last_prompt: String,
}

/// One knowledge-base entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
struct KnowledgeBaseArgs {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(rename = "type", default)]
    kind: String,
    knowledge_base: String,
    #[serde(default)]
    system_prompt: String,
    #[serde(default)]
    last_prompt: String,
}

fn default_top_k() -> usize {
    2
}

impl KnowledgeBaseComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: KnowledgeBaseArgs =
            serde_json::from_value(args.clone()).map_err(|e| CadenzaError::ComponentArgs {
                component: "knowledge-base-tool".to_string(),
                message: e.to_string(),
            })?;

        let entries = load_entries(Path::new(&parsed.knowledge_base))?;
        debug!(
            path = %parsed.knowledge_base,
            entries = entries.len(),
            "Loaded knowledge base"
        );

        Ok(Self {
            top_k: parsed.top_k,
            qa_mode: parsed.kind.eq_ignore_ascii_case("qa"),
            entries,
            system_prompt: parsed.system_prompt,
            last_prompt: parsed.last_prompt,
        })
    }

    /// Build from in-memory entries (test and embedding use).
    pub fn from_entries(entries: Vec<KnowledgeEntry>, top_k: usize, qa_mode: bool) -> Self {
        Self {
            top_k,
            qa_mode,
            entries,
            system_prompt: String::new(),
            last_prompt: String::new(),
        }
    }

    /// System-prompt text the host should use when it feeds the retrieved
    /// knowledge to the model.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Last-prompt text the host should use alongside the retrieval.
    pub fn last_prompt(&self) -> &str {
        &self.last_prompt
    }

    fn match_text<'a>(&self, entry: &'a KnowledgeEntry) -> Option<&'a str> {
        if self.qa_mode {
            entry.question.as_deref()
        } else {
            entry.text.as_deref()
        }
    }

    fn doc_text<'a>(&self, entry: &'a KnowledgeEntry) -> Option<&'a str> {
        if self.qa_mode {
            entry.answer.as_deref().or(entry.question.as_deref())
        } else {
            entry.text.as_deref()
        }
    }
}

fn load_entries(path: &Path) -> Result<Vec<KnowledgeEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| CadenzaError::ComponentArgs {
        component: "knowledge-base-tool".to_string(),
        message: format!("cannot read knowledge base '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|e| CadenzaError::ComponentArgs {
        component: "knowledge-base-tool".to_string(),
        message: format!("cannot parse knowledge base '{}': {}", path.display(), e),
    })
}

/// Case-insensitive alphanumeric tokens.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn overlap(query: &[String], candidate: &str) -> usize {
    let candidate = tokens(candidate);
    query.iter().filter(|t| candidate.contains(t)).count()
}

impl ToolComponent for KnowledgeBaseComponent {
    fn name(&self) -> &str {
        "knowledge-base-tool"
    }

    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>> {
        let query = args
            .get_str("query")
            .ok_or_else(|| CadenzaError::ToolExecution {
                tool: self.name().to_string(),
                message: "args missing 'query'".to_string(),
            })?;
        let query_tokens = tokens(query);

        let mut scored: Vec<(usize, &KnowledgeEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let candidate = self.match_text(entry)?;
                let score = overlap(&query_tokens, candidate);
                (score > 0).then_some((score, entry))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let docs: Vec<Value> = scored
            .iter()
            .take(self.top_k)
            .filter_map(|(_, entry)| self.doc_text(entry))
            .map(|text| Value::String(text.to_string()))
            .collect();

        let knowledge = docs
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        debug!(query, hits = docs.len(), "Knowledge base lookup");

        let mut out = Map::new();
        out.insert("docs".into(), Value::Array(docs));
        out.insert("knowledge".into(), Value::String(knowledge));
        Ok(out)
    }
}
