use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

/// An item as the model describes it, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftItem {
    pub title: String,
    #[serde(alias = "brand", alias = "attribution")]
    pub author: String,
    pub description: String,
}

/// A fully enriched recommendation. Field names follow the frontend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub title: String,
    #[serde(alias = "brand", alias = "attribution")]
    pub author: String,
    pub description: String,
    pub image_url: String,
    pub amazon_link: String,
}

impl RecommendedItem {
    #[must_use]
    pub fn from_draft(draft: DraftItem, image_url: String, amazon_link: String) -> Self {
        Self {
            title: draft.title,
            author: draft.author,
            description: draft.description,
            image_url,
            amazon_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub books: Vec<RecommendedItem>,
}

impl GenerationResponse {
    /// Answer served when no generation credential is configured.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            books: vec![RecommendedItem {
                title: "Demo Book 1".to_string(),
                author: "Demo Author".to_string(),
                description: "OpenAI Key missing. Please add it to the environment variables."
                    .to_string(),
                image_url: constants::placeholder::DEMO_COVER.to_string(),
                amazon_link: "#".to_string(),
            }],
        }
    }
}
