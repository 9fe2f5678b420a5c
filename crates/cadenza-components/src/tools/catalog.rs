//! Catalog-backed lookup tools.
//!
//! These components take no construction arguments: they are built against a
//! shared `Catalog` when the registry is assembled and read the runtime query
//! from the compile context. Lookups are deterministic lexical scans; nothing
//! here touches the network.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use cadenza_core::{ArgsMap, CadenzaError, Result};

use crate::component::ToolComponent;

/// How many items the recommendation tool returns.
const TOP_RECOMMENDATIONS: usize = 3;

/// How many categories the category tool returns.
const TOP_CATEGORIES: usize = 5;

/// The domain catalog backing the lookup tools.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    /// Fallback line the static tool returns.
    #[serde(default = "default_static_reply")]
    pub static_reply: String,
}

/// One catalog item.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogItem {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub rating: f32,
}

fn default_static_reply() -> String {
    "I could not find anything matching that request.".to_string()
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: vec![],
            static_reply: default_static_reply(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CadenzaError::ComponentArgs {
            component: "catalog".to_string(),
            message: format!("cannot read catalog '{}': {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| CadenzaError::ComponentArgs {
            component: "catalog".to_string(),
            message: format!("cannot parse catalog '{}': {}", path.display(), e),
        })
    }
}

fn require_query<'a>(tool: &str, args: &'a ArgsMap) -> Result<&'a str> {
    args.get_str("query").ok_or_else(|| CadenzaError::ToolExecution {
        tool: tool.to_string(),
        message: "args missing 'query'".to_string(),
    })
}

/// Finds the catalog item the query names, if any.
pub struct MatchComponent {
    catalog: Arc<Catalog>,
}

impl MatchComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolComponent for MatchComponent {
    fn name(&self) -> &str {
        "match"
    }

    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>> {
        let query = require_query(self.name(), args)?.to_lowercase();

        let hit = self
            .catalog
            .items
            .iter()
            .find(|item| !item.name.is_empty() && query.contains(&item.name.to_lowercase()));

        let mut out = Map::new();
        out.insert(
            "match_result".into(),
            match hit {
                Some(item) => Value::String(item.name.clone()),
                None => Value::Null,
            },
        );
        Ok(out)
    }
}

/// Ranks catalog items by how many of their keywords the query mentions.
pub struct SearchComponent {
    catalog: Arc<Catalog>,
}

impl SearchComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn score(item: &CatalogItem, query: &str) -> usize {
        let mut score = item
            .keywords
            .iter()
            .filter(|k| query.contains(&k.to_lowercase()))
            .count();
        if !item.name.is_empty() && query.contains(&item.name.to_lowercase()) {
            score += 2;
        }
        score
    }
}

impl ToolComponent for SearchComponent {
    fn name(&self) -> &str {
        "search"
    }

    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>> {
        let query = require_query(self.name(), args)?.to_lowercase();

        let mut scored: Vec<(usize, &CatalogItem)> = self
            .catalog
            .items
            .iter()
            .filter_map(|item| {
                let score = Self::score(item, &query);
                (score > 0).then_some((score, item))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<Value> = scored
            .iter()
            .map(|(_, item)| Value::String(item.name.clone()))
            .collect();
        debug!(hits = results.len(), "Catalog search");

        let mut out = Map::new();
        out.insert("search_results".into(), Value::Array(results));
        Ok(out)
    }
}

/// Returns the highest-rated catalog items.
pub struct RecommendComponent {
    catalog: Arc<Catalog>,
}

impl RecommendComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolComponent for RecommendComponent {
    fn name(&self) -> &str {
        "recommendation"
    }

    fn call(&self, _args: &ArgsMap) -> Result<Map<String, Value>> {
        let mut ranked: Vec<&CatalogItem> = self.catalog.items.iter().collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let recommendations: Vec<Value> = ranked
            .iter()
            .take(TOP_RECOMMENDATIONS)
            .map(|item| Value::String(item.name.clone()))
            .collect();

        let mut out = Map::new();
        out.insert("recommendations".into(), Value::Array(recommendations));
        Ok(out)
    }
}

/// Returns the catalog's configured fallback reply.
pub struct StaticComponent {
    catalog: Arc<Catalog>,
}

impl StaticComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolComponent for StaticComponent {
    fn name(&self) -> &str {
        "static"
    }

    fn call(&self, _args: &ArgsMap) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        out.insert(
            "reply".into(),
            Value::String(self.catalog.static_reply.clone()),
        );
        Ok(out)
    }
}

/// Returns the categories with the most items.
pub struct TopCategoryComponent {
    catalog: Arc<Catalog>,
}

impl TopCategoryComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolComponent for TopCategoryComponent {
    fn name(&self) -> &str {
        "category"
    }

    fn call(&self, _args: &ArgsMap) -> Result<Map<String, Value>> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in &self.catalog.items {
            if !item.category.is_empty() {
                *counts.entry(item.category.as_str()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        // Count desc, then name for a stable order
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let categories: Vec<Value> = ranked
            .iter()
            .take(TOP_CATEGORIES)
            .map(|(name, _)| Value::String(name.to_string()))
            .collect();

        let mut out = Map::new();
        out.insert("top_categories".into(), Value::Array(categories));
        Ok(out)
    }
}

/// Classifies the query into the catalog category it most resembles.
pub struct UserIntentComponent {
    catalog: Arc<Catalog>,
}

/// Intent reported when no category keyword matches.
const FALLBACK_INTENT: &str = "chat";

impl UserIntentComponent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolComponent for UserIntentComponent {
    fn name(&self) -> &str {
        "intent"
    }

    fn call(&self, args: &ArgsMap) -> Result<Map<String, Value>> {
        let query = require_query(self.name(), args)?.to_lowercase();

        let mut scores: HashMap<&str, usize> = HashMap::new();
        for item in &self.catalog.items {
            if item.category.is_empty() {
                continue;
            }
            let hits = item
                .keywords
                .iter()
                .filter(|k| query.contains(&k.to_lowercase()))
                .count();
            *scores.entry(item.category.as_str()).or_default() += hits;
        }

        let intent = scores
            .into_iter()
            .filter(|(_, hits)| *hits > 0)
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(category, _)| category.to_string())
            .unwrap_or_else(|| FALLBACK_INTENT.to_string());

        let mut out = Map::new();
        out.insert("intent".into(), Value::String(intent));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog {
            items: vec![
                CatalogItem {
                    name: "trail runner".into(),
                    category: "shoes".into(),
                    keywords: vec!["run".into(), "trail".into()],
                    blurb: "Light trail shoe.".into(),
                    rating: 4.6,
                },
                CatalogItem {
                    name: "rain jacket".into(),
                    category: "outerwear".into(),
                    keywords: vec!["rain".into(), "jacket".into()],
                    blurb: "Waterproof shell.".into(),
                    rating: 4.8,
                },
                CatalogItem {
                    name: "wool socks".into(),
                    category: "shoes".into(),
                    keywords: vec!["socks".into(), "wool".into()],
                    blurb: "Warm socks.".into(),
                    rating: 4.1,
                },
            ],
            static_reply: "Ask me about our gear.".into(),
        })
    }

    fn query_args(q: &str) -> ArgsMap {
        let mut args = ArgsMap::new();
        args.set_str("query", q);
        args
    }

    #[test]
    fn test_match_finds_named_item() {
        let out = MatchComponent::new(catalog())
            .call(&query_args("do you have the Rain Jacket in stock?"))
            .unwrap();
        assert_eq!(out.get("match_result").unwrap(), "rain jacket");
    }

    #[test]
    fn test_match_misses_cleanly() {
        let out = MatchComponent::new(catalog())
            .call(&query_args("anything warm?"))
            .unwrap();
        assert_eq!(out.get("match_result").unwrap(), &Value::Null);
    }

    #[test]
    fn test_search_ranks_by_keyword_hits() {
        let out = SearchComponent::new(catalog())
            .call(&query_args("trail run gear"))
            .unwrap();
        let results = out.get("search_results").unwrap().as_array().unwrap();
        assert_eq!(results[0], "trail runner");
    }

    #[test]
    fn test_recommendation_orders_by_rating() {
        let out = RecommendComponent::new(catalog())
            .call(&ArgsMap::new())
            .unwrap();
        let recs = out.get("recommendations").unwrap().as_array().unwrap();
        assert_eq!(recs[0], "rain jacket");
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_static_returns_configured_reply() {
        let out = StaticComponent::new(catalog())
            .call(&ArgsMap::new())
            .unwrap();
        assert_eq!(out.get("reply").unwrap(), "Ask me about our gear.");
    }

    #[test]
    fn test_top_categories_counted() {
        let out = TopCategoryComponent::new(catalog())
            .call(&ArgsMap::new())
            .unwrap();
        let categories = out.get("top_categories").unwrap().as_array().unwrap();
        assert_eq!(categories[0], "shoes");
    }

    #[test]
    fn test_intent_classifies_query() {
        let out = UserIntentComponent::new(catalog())
            .call(&query_args("I need a jacket for the rain"))
            .unwrap();
        assert_eq!(out.get("intent").unwrap(), "outerwear");
    }

    #[test]
    fn test_intent_falls_back_to_chat() {
        let out = UserIntentComponent::new(catalog())
            .call(&query_args("hello there"))
            .unwrap();
        assert_eq!(out.get("intent").unwrap(), "chat");
    }

    #[test]
    fn test_catalog_load_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"items": [{"name": "thing"}]}"#).unwrap();

        let loaded = Catalog::load(file.path()).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.static_reply, default_static_reply());
    }
}
