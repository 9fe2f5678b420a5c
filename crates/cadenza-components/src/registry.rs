use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use cadenza_core::{CadenzaError, Result};

use crate::component::Component;
use crate::prompt::{
    CotComponent, DemonstrationComponent, OutputComponent, RuleComponent, StyleComponent,
    TaskComponent,
};
use crate::tools::{
    Catalog, ExtractComponent, KnowledgeBaseComponent, MatchComponent, RecommendComponent,
    SearchComponent, StaticComponent, TopCategoryComponent, UserIntentComponent,
};

type Builder = Arc<dyn Fn(&Value) -> Result<Component> + Send + Sync>;

/// Factory registry mapping component tags to builders.
///
/// The graph builder resolves every `(tag, args)` entry of a description
/// through this registry. Unknown tags fail construction. New component
/// kinds plug in with `register`, no engine changes.
#[derive(Default)]
pub struct ComponentRegistry {
    builders: HashMap<String, Builder>,
    aliases: HashMap<String, String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for a tag.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        builder: impl Fn(&Value) -> Result<Component> + Send + Sync + 'static,
    ) {
        self.builders.insert(tag.into(), Arc::new(builder));
    }

    /// Register an alternate spelling for an existing tag.
    pub fn alias(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.aliases.insert(alias.into(), canonical.into());
    }

    /// Whether a tag (or alias) is known.
    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(self.resolve(tag))
    }

    /// All canonical tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.builders.keys().map(|s| s.as_str()).collect();
        tags.sort_unstable();
        tags
    }

    fn resolve<'a>(&'a self, tag: &'a str) -> &'a str {
        self.aliases.get(tag).map(|s| s.as_str()).unwrap_or(tag)
    }

    /// Build one live component from a declared `(tag, args)` entry.
    pub fn build(&self, tag: &str, args: &Value) -> Result<Component> {
        let canonical = self.resolve(tag);
        let builder = self
            .builders
            .get(canonical)
            .ok_or_else(|| CadenzaError::UnknownComponentKind(tag.to_string()))?;
        let component = builder(args)?;
        debug!(tag, capability = ?component.capability(), "Built component");
        Ok(component)
    }

    /// A registry with every built-in component kind registered.
    ///
    /// The catalog backs the no-argument lookup tools; pass
    /// `Arc::new(Catalog::default())` when a description does not use them.
    pub fn with_builtins(catalog: Arc<Catalog>) -> Self {
        let mut registry = Self::new();

        // ── Prompt producers ────────────────────────────────────
        registry.register("style", |args| {
            Ok(Component::system(StyleComponent::from_args(args)?))
        });
        registry.register("task", |args| {
            Ok(Component::system(TaskComponent::from_args(args)?))
        });
        registry.register("rule", |args| {
            Ok(Component::system(RuleComponent::from_args(args)?))
        });
        registry.register("demonstration", |args| {
            Ok(Component::system(DemonstrationComponent::from_args(args)?))
        });
        registry.register("cot", |args| {
            Ok(Component::system(CotComponent::from_args(args)?))
        });
        registry.register("output", |args| {
            Ok(Component::last(OutputComponent::from_args(args)?))
        });

        // ── Configured tools ────────────────────────────────────
        registry.register("knowledge-base-tool", |args| {
            Ok(Component::tool(KnowledgeBaseComponent::from_args(args)?))
        });
        registry.register("extract-tool", |args| {
            Ok(Component::tool(ExtractComponent::from_args(args)?))
        });

        // ── Catalog lookups ─────────────────────────────────────
        let c = catalog.clone();
        registry.register("match", move |_| {
            Ok(Component::tool(MatchComponent::new(c.clone())))
        });
        let c = catalog.clone();
        registry.register("search", move |_| {
            Ok(Component::tool(SearchComponent::new(c.clone())))
        });
        let c = catalog.clone();
        registry.register("recommendation", move |_| {
            Ok(Component::tool(RecommendComponent::new(c.clone())))
        });
        let c = catalog.clone();
        registry.register("static", move |_| {
            Ok(Component::tool(StaticComponent::new(c.clone())))
        });
        let c = catalog.clone();
        registry.register("category", move |_| {
            Ok(Component::tool(TopCategoryComponent::new(c.clone())))
        });
        let c = catalog;
        registry.register("intent", move |_| {
            Ok(Component::tool(UserIntentComponent::new(c.clone())))
        });

        // ── Legacy tag spellings ────────────────────────────────
        registry.alias("KnowledgeBaseComponent", "knowledge-base-tool");
        registry.alias("ExtractComponent", "extract-tool");
        registry.alias("MatchComponent", "match");
        registry.alias("SearchComponent", "search");
        registry.alias("RecomComponent", "recommendation");
        registry.alias("StaticComponent", "static");
        registry.alias("Top_Category_ShoppingComponent", "category");
        registry.alias("User_Intent_ShoppingComponent", "intent");

        registry
    }
}
