mod covers;
mod generate;
mod refresh;
mod retag;
mod sitemap;

pub use covers::cmd_refresh_covers;
pub use generate::cmd_generate;
pub use refresh::cmd_refresh_niche;
pub use retag::cmd_retag_links;
pub use sitemap::cmd_sitemap;
