//! Cover refresh command handler

use std::time::Duration;

use crate::clients::build_http_client;
use crate::clients::google_books::GoogleBooksClient;
use crate::config::Config;
use crate::services::CatalogStore;
use crate::services::maintenance::refresh_covers;

pub async fn cmd_refresh_covers(config: &Config) -> anyhow::Result<()> {
    let store = CatalogStore::new(&config.catalog.content_path);
    let mut catalog = store.load_or_default().await?;

    if catalog.item_count() == 0 {
        println!("No items in {}.", store.path().display());
        return Ok(());
    }

    let http = build_http_client(config.general.request_timeout_seconds)?;
    let lookup = GoogleBooksClient::with_shared_client(http, &config.books);
    let pause = Duration::from_millis(config.catalog.cover_refresh_pause_ms);

    println!("Checking covers for {} items...", catalog.item_count());
    let report = refresh_covers(&mut catalog, &lookup, pause).await;

    println!("{:-<40}", "");
    println!("Checked: {}", report.checked);
    println!("Updated: {}", report.updated);
    println!("No cover found: {}", report.missing);

    if report.updated > 0 {
        store.save(&mut catalog).await?;
        println!("Saved {}", store.path().display());
    } else {
        println!("No changes needed.");
    }

    Ok(())
}
