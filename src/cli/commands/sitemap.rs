//! Sitemap command handler

use anyhow::Context;

use crate::config::Config;
use crate::services::{CatalogStore, sitemap};

pub async fn cmd_sitemap(config: &Config, output: Option<&str>) -> anyhow::Result<()> {
    let catalog = CatalogStore::new(&config.catalog.content_path)
        .load_or_default()
        .await?;

    let entries = sitemap::build_entries(&catalog, &config.catalog.site_url, chrono::Utc::now());
    let xml = sitemap::render(&entries)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &xml)
                .await
                .with_context(|| format!("Failed to write sitemap to {path}"))?;
            println!("Sitemap written to {path} ({} urls)", entries.len());
        }
        None => println!("{xml}"),
    }

    Ok(())
}
