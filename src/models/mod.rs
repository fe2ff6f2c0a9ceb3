pub mod catalog;
pub mod recommendation;

pub use catalog::{Catalog, CatalogItem, Niche, NicheSummary};
pub use recommendation::{DraftItem, GenerationRequest, GenerationResponse, RecommendedItem};
