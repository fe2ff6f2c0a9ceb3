pub mod catalog;
pub use catalog::{CatalogError, CatalogStore};

pub mod generator;
pub use generator::{GenerationError, RecommendationGenerator};

pub mod image;
pub use image::ImageResolver;

pub mod links;

pub mod maintenance;
pub use maintenance::{CoverRefreshReport, NicheRefresh, RefreshSource};

pub mod sitemap;
pub use sitemap::SitemapEntry;
