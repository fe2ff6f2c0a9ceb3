use serde::{Deserialize, Serialize};

use super::recommendation::RecommendedItem;

/// The static content document backing the catalog pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub niches: Vec<Niche>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Niche {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "products")]
    pub books: Vec<CatalogItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub title: String,
    #[serde(default, alias = "brand")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub amazon_link: String,
}

impl From<RecommendedItem> for CatalogItem {
    fn from(item: RecommendedItem) -> Self {
        Self {
            title: item.title,
            author: item.author,
            category: None,
            description: item.description,
            image_url: item.image_url,
            amazon_link: item.amazon_link,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NicheSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl From<&Niche> for NicheSummary {
    fn from(niche: &Niche) -> Self {
        Self {
            slug: niche.slug.clone(),
            title: niche.title.clone(),
            description: niche.description.clone(),
            item_count: niche.books.len(),
            cover_image: niche
                .books
                .first()
                .map(|b| b.image_url.clone())
                .filter(|url| !url.is_empty()),
        }
    }
}

impl Catalog {
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&Niche> {
        self.niches.iter().find(|n| n.slug == slug)
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<NicheSummary> {
        self.niches.iter().map(NicheSummary::from).collect()
    }

    /// Replaces the niche with the same slug. Returns false if none matched.
    pub fn replace(&mut self, niche: Niche) -> bool {
        match self.niches.iter_mut().find(|n| n.slug == niche.slug) {
            Some(existing) => {
                *existing = niche;
                true
            }
            None => false,
        }
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut CatalogItem> {
        self.niches.iter_mut().flat_map(|n| n.books.iter_mut())
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.niches.iter().map(|n| n.books.len()).sum()
    }
}
