//! Affiliate retag command handler

use crate::config::Config;
use crate::services::CatalogStore;
use crate::services::maintenance::retag_links;

pub async fn cmd_retag_links(config: &Config) -> anyhow::Result<()> {
    let store = CatalogStore::new(&config.catalog.content_path);
    let mut catalog = store.load_or_default().await?;

    let changed = retag_links(&mut catalog, &config.affiliate);

    if changed == 0 {
        println!("All links already use tag '{}'.", config.affiliate.tag);
        return Ok(());
    }

    store.save(&mut catalog).await?;
    println!(
        "Updated {} links to tag '{}' in {}",
        changed,
        config.affiliate.tag,
        store.path().display()
    );

    Ok(())
}
