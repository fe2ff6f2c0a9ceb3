//! Batch jobs over the content document: cover refresh, affiliate retagging
//! and niche regeneration.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::time::Duration;
use tracing::{info, warn};

use super::catalog::CatalogError;
use super::generator::{GenerationError, RecommendationGenerator};
use super::image::lookup_cover;
use super::links::{retag_link, upgrade_to_https};
use crate::clients::CoverLookup;
use crate::config::AffiliateConfig;
use crate::constants::limits::REFRESH_ITEM_COUNT;
use crate::models::{Catalog, CatalogItem, Niche};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoverRefreshReport {
    pub checked: usize,
    pub updated: usize,
    pub missing: usize,
}

/// Looks up a fresh cover for every item and replaces changed ones.
pub async fn refresh_covers(
    catalog: &mut Catalog,
    lookup: &dyn CoverLookup,
    pause: Duration,
) -> CoverRefreshReport {
    let total = catalog.item_count();
    let mut report = CoverRefreshReport::default();

    for item in catalog.items_mut() {
        report.checked += 1;
        info!(
            "[{}/{}] Checking: {} by {}",
            report.checked, total, item.title, item.author
        );

        match lookup_cover(lookup, &item.title, &item.author).await {
            Some(url) => {
                let url = upgrade_to_https(&url);
                if url != item.image_url {
                    item.image_url = url;
                    report.updated += 1;
                }
            }
            None => report.missing += 1,
        }

        if !pause.is_zero() && report.checked < total {
            tokio::time::sleep(pause).await;
        }
    }

    report
}

/// Moves every purchase link onto the configured tag. Returns the number of
/// links changed.
pub fn retag_links(catalog: &mut Catalog, affiliate: &AffiliateConfig) -> usize {
    let mut count = 0;
    for item in catalog.items_mut() {
        if let Some(link) = retag_link(&item.amazon_link, &affiliate.legacy_tag, &affiliate.tag) {
            item.amazon_link = link;
            count += 1;
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct NicheRefresh {
    pub slug: String,
    pub source: RefreshSource,
    pub item_count: usize,
}

/// Regenerates one niche (by slug, or a random one) in place. When the model
/// is unavailable or fails, a random sample of built-in picks is used.
pub async fn refresh_niche<R: Rng>(
    catalog: &mut Catalog,
    generator: &RecommendationGenerator,
    affiliate: &AffiliateConfig,
    slug: Option<&str>,
    rng: &mut R,
) -> Result<NicheRefresh, CatalogError> {
    let target = match slug {
        Some(slug) => catalog
            .find(slug)
            .cloned()
            .ok_or_else(|| CatalogError::NicheNotFound(slug.to_string()))?,
        None => catalog.niches.choose(rng).cloned().ok_or(CatalogError::Empty)?,
    };

    info!(niche = %target.title, "Generating content for niche");

    let (books, source) = match generator.generate_for_niche(&target, REFRESH_ITEM_COUNT).await {
        Ok(items) => (
            items.into_iter().map(CatalogItem::from).collect(),
            RefreshSource::Generated,
        ),
        Err(e) => {
            match e {
                GenerationError::Unavailable => {
                    warn!("No generation credential, running in simulation mode");
                }
                other => warn!("Generation failed: {}. Falling back to built-in picks.", other),
            }
            (fallback_sample(affiliate, rng), RefreshSource::Fallback)
        }
    };

    let refreshed = NicheRefresh {
        slug: target.slug.clone(),
        source,
        item_count: books.len(),
    };

    catalog.replace(Niche { books, ..target });
    Ok(refreshed)
}

/// Between one and three of the built-in picks, tagged with the current tag.
pub fn fallback_sample<R: Rng>(affiliate: &AffiliateConfig, rng: &mut R) -> Vec<CatalogItem> {
    let picks = fallback_picks(affiliate);
    let amount = rng.random_range(1..=picks.len());
    picks.choose_multiple(rng, amount).cloned().collect()
}

fn fallback_picks(affiliate: &AffiliateConfig) -> Vec<CatalogItem> {
    let pick = |title: &str, author: &str, description: &str, image: &str, asin: &str| CatalogItem {
        title: title.to_string(),
        author: author.to_string(),
        category: None,
        description: description.to_string(),
        image_url: image.to_string(),
        amazon_link: format!(
            "https://amazon.com/dp/{asin}?tag={}",
            urlencoding::encode(&affiliate.tag)
        ),
    };

    vec![
        pick(
            "The Innovators",
            "Walter Isaacson",
            "A riveting history of the digital revolution.",
            "https://m.media-amazon.com/images/I/81p2zWd0+YL._AC_UF1000,1000_QL80_.jpg",
            "147670869X",
        ),
        pick(
            "Superintelligence",
            "Nick Bostrom",
            "Paths, Dangers, Strategies. Essential for thinking about AI safety.",
            "https://m.media-amazon.com/images/I/7106J1U1CaL._AC_UF1000,1000_QL80_.jpg",
            "0199678111",
        ),
        pick(
            "Clean Code",
            "Robert C. Martin",
            "A handbook of agile software craftsmanship. A classic for a reason.",
            "https://m.media-amazon.com/images/I/51E2055ZGUL._AC_UF1000,1000_QL80_.jpg",
            "0132350882",
        ),
    ]
}
