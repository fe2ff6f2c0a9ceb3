use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use super::CoverLookup;
use crate::config::BooksConfig;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    #[serde(rename = "imageLinks", default)]
    image_links: HashMap<String, String>,
}

/// Google Books volumes search, used only for cover images.
#[derive(Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    image_preference: Vec<String>,
}

impl GoogleBooksClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &BooksConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            image_preference: config.image_preference.clone(),
        }
    }

    fn search_url(&self, title: &str, author: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/volumes", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &format!("intitle:{title}+inauthor:{author}"));
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl CoverLookup for GoogleBooksClient {
    async fn find_cover(&self, title: &str, author: &str) -> Result<Option<String>> {
        let url = self.search_url(title, author)?;

        debug!(title = %title, author = %author, "Looking up cover");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Google Books API error: {} - {}",
                status,
                body
            ));
        }

        let response: VolumesResponse = response.json().await?;

        Ok(response.items.into_iter().next().and_then(|volume| {
            pick_image_link(&volume.volume_info.image_links, &self.image_preference)
                .map(enhance_resolution)
        }))
    }
}

/// First non-empty link in preference order.
#[must_use]
pub fn pick_image_link<'a>(
    links: &'a HashMap<String, String>,
    preference: &[String],
) -> Option<&'a str> {
    preference
        .iter()
        .filter_map(|key| links.get(key))
        .map(String::as_str)
        .find(|url| !url.is_empty())
}

/// Asks for the next zoom level and drops the page-curl effect.
#[must_use]
pub fn enhance_resolution(url: &str) -> String {
    url.replace("&zoom=1", "&zoom=2").replace("&edge=curl", "")
}
