//! Component catalog for Cadenza.
//!
//! A component is a unit that either renders a prompt fragment or performs a
//! tool lookup during prompt compilation. Components are built from the
//! declarative description by the `ComponentRegistry` and carry exactly one
//! capability; the graph engine dispatches on that capability alone.

pub mod component;
pub mod prompt;
pub mod registry;
pub mod template;
pub mod tools;

pub use component::{Capability, Component, PromptRenderer, ToolComponent};
pub use prompt::{
    CotComponent, DemonstrationComponent, OutputComponent, RuleComponent, StyleComponent,
    TaskComponent,
};
pub use registry::ComponentRegistry;
pub use template::fill_template;
pub use tools::{
    Catalog, CatalogItem, ExtractComponent, KnowledgeBaseComponent, KnowledgeEntry, MatchComponent,
    RecommendComponent, SearchComponent, StaticComponent, TopCategoryComponent, UserIntentComponent,
};
