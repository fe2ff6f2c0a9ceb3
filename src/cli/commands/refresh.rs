//! Niche refresh command handler

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clients::build_http_client;
use crate::config::Config;
use crate::services::maintenance::refresh_niche;
use crate::services::{CatalogStore, RecommendationGenerator, RefreshSource};

pub async fn cmd_refresh_niche(
    config: &Config,
    slug: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let store = CatalogStore::new(&config.catalog.content_path);
    let mut catalog = store.load_or_default().await?;

    let http = build_http_client(config.general.request_timeout_seconds)?;
    let generator = RecommendationGenerator::from_config(config, http);
    let mut rng = StdRng::from_os_rng();

    let refreshed =
        refresh_niche(&mut catalog, &generator, &config.affiliate, slug, &mut rng).await?;

    let source = match refreshed.source {
        RefreshSource::Generated => "generated",
        RefreshSource::Fallback => "built-in picks",
    };
    println!(
        "Niche '{}' refreshed with {} items ({})",
        refreshed.slug, refreshed.item_count, source
    );

    if dry_run {
        if let Some(niche) = catalog.find(&refreshed.slug) {
            println!("{}", serde_json::to_string_pretty(niche)?);
        }
        println!("Dry run, nothing saved.");
        return Ok(());
    }

    store.save(&mut catalog).await?;
    println!("Saved {}", store.path().display());

    Ok(())
}
