pub mod catalog;
pub mod extract;
pub mod knowledge;

pub use catalog::{
    Catalog, CatalogItem, MatchComponent, RecommendComponent, SearchComponent, StaticComponent,
    TopCategoryComponent, UserIntentComponent,
};
pub use extract::ExtractComponent;
pub use knowledge::{KnowledgeBaseComponent, KnowledgeEntry};
