use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Catalog;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const STATIC_ROUTES: &[&str] = &["", "/all", "/create"];

#[derive(Debug, Serialize)]
#[serde(rename = "urlset")]
struct UrlSet<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "url")]
    urls: &'a [SitemapEntry],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: String,
}

/// Static pages first, then one page per niche.
#[must_use]
pub fn build_entries(catalog: &Catalog, site_url: &str, now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = site_url.trim_end_matches('/');
    let now = now.to_rfc3339();

    let niche_lastmod = DateTime::parse_from_rfc3339(&catalog.last_updated)
        .map(|d| d.with_timezone(&Utc).to_rfc3339())
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(&catalog.last_updated, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|d| d.and_utc().to_rfc3339())
        })
        .unwrap_or_else(|_| now.clone());

    let statics = STATIC_ROUTES.iter().map(|route| SitemapEntry {
        loc: format!("{base}{route}"),
        lastmod: now.clone(),
        changefreq: "daily",
        priority: "1.0".to_string(),
    });

    let niches = catalog.niches.iter().map(|niche| SitemapEntry {
        loc: format!("{base}/niche/{}", niche.slug),
        lastmod: niche_lastmod.clone(),
        changefreq: "weekly",
        priority: "0.8".to_string(),
    });

    statics.chain(niches).collect()
}

pub fn render(entries: &[SitemapEntry]) -> Result<String> {
    let body = quick_xml::se::to_string(&UrlSet {
        xmlns: SITEMAP_NS,
        urls: entries,
    })
    .map_err(|e| anyhow::anyhow!("Failed to serialize sitemap: {e}"))?;

    Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{body}"#))
}
