use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use cadenza_core::{ArgsMap, CadenzaError, Result};

use crate::component::ToolComponent;

/// Extracts tagged spans from the model's latest response.
///
/// For each configured extract word `w`, captures the text between `<w>` and
/// `</w>` in the response and returns it under the key `w`. Pairs with the
/// output component, which instructs the model to produce exactly that shape.
/// The short/long word lists mark which captures feed short-term versus
/// long-term memory; that policy lives with the caller.
pub struct ExtractComponent {
    short_words: Vec<String>,
    long_words: Vec<String>,
    system_prompt: String,
    last_prompt: String,
}

#[derive(Deserialize, Default)]
#[serde(untagged)]
enum WordList {
    #[default]
    Empty,
    One(String),
    Many(Vec<String>),
}

impl WordList {
    fn into_vec(self) -> Vec<String> {
        match self {
            WordList::Empty => vec![],
            WordList::One(w) => vec![w],
            WordList::Many(ws) => ws,
        }
    }
}

#[derive(Deserialize)]
struct ExtractArgs {
    #[serde(default)]
    short_memory_extract_words: WordList,
    #[serde(default)]
    long_memory_extract_words: WordList,
    #[serde(default)]
    system_prompt: String,
    #[serde(default)]
    last_prompt: String,
}

impl ExtractComponent {
    pub fn from_args(args: &Value) -> Result<Self> {
        let parsed: ExtractArgs =
            serde_json::from_value(args.clone()).map_err(|e| CadenzaError::ComponentArgs {
                component: "extract-tool".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            short_words: parsed.short_memory_extract_words.into_vec(),
            long_words: parsed.long_memory_extract_words.into_vec(),
            system_prompt: parsed.system_prompt,
            last_prompt: parsed.last_prompt,
        })
    }

    /// Words whose captures feed short-term memory.
    pub fn short_words(&self) -> &[String] {
        &self.short_words
    }

    /// Words whose captures feed long-term memory.
    pub fn long_words(&self) -> &[String] {
        &self.long_words
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn last_prompt(&self) -> &str {
        &self.last_prompt
    }
}

/// Capture the span between `<word>` and `</word>`, trimmed.
fn extract_tag(text: &str, word: &str) -> Option<String> {
    let open = format!("<{}>", word);
    let close = format!("</{}>", word);
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    Some(text[start..end].trim().to_string())
}

impl ToolComponent for ExtractComponent {
    fn name(&self) -> &str {
        "extract-tool"
    }

    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        let Some(text) = args.get_str("response").or_else(|| args.get_str("input")) else {
            // Nothing to scan yet
            return Ok(out);
        };

        for word in self.short_words.iter().chain(&self.long_words) {
            if let Some(span) = extract_tag(text, word) {
                out.insert(word.clone(), Value::String(span));
            }
        }
        debug!(captures = out.len(), "Extracted tagged spans");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn component() -> ExtractComponent {
        ExtractComponent::from_args(&json!({
            "short_memory_extract_words": ["order_id"],
            "long_memory_extract_words": ["preference"],
            "system_prompt": "",
            "last_prompt": ""
        }))
        .unwrap()
    }

    #[test]
    fn test_captures_both_lists() {
        let mut args = ArgsMap::new();
        args.set_str(
            "response",
            "Sure. <order_id> 42-A </order_id> and <preference>email</preference>.",
        );

        let out = component().call(&args).unwrap();
        assert_eq!(out.get("order_id").unwrap(), "42-A");
        assert_eq!(out.get("preference").unwrap(), "email");
    }

    #[test]
    fn test_absent_tag_yields_no_entry() {
        let mut args = ArgsMap::new();
        args.set_str("response", "no tags here");

        let out = component().call(&args).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_falls_back_to_input_key() {
        let mut args = ArgsMap::new();
        args.set_str("input", "<order_id>7</order_id>");

        let out = component().call(&args).unwrap();
        assert_eq!(out.get("order_id").unwrap(), "7");
    }

    #[test]
    fn test_no_text_is_not_an_error() {
        let out = component().call(&ArgsMap::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_word_accepted() {
        let c = ExtractComponent::from_args(&json!({
            "short_memory_extract_words": "topic"
        }))
        .unwrap();
        assert_eq!(c.short_words(), ["topic"]);
        assert!(c.long_words().is_empty());
    }

    #[test]
    fn test_unclosed_tag_ignored() {
        let mut args = ArgsMap::new();
        args.set_str("response", "<order_id>42");

        let out = component().call(&args).unwrap();
        assert!(out.is_empty());
    }
}
