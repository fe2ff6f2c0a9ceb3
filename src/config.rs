use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub generator: GeneratorConfig,

    pub openai: OpenAiConfig,

    pub books: BooksConfig,

    pub affiliate: AffiliateConfig,

    pub catalog: CatalogConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Timeout applied to every outbound HTTP request, in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Where item images come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Query the books metadata API and fall back to a placeholder.
    #[default]
    Lookup,
    /// Always use a placeholder embedding the item title.
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of items requested from the model per generation.
    pub item_count: usize,

    /// Plural noun used in prompts, e.g. "books" or "products".
    pub item_kind: String,

    /// Word used for the attribution field in prompts ("author" or "brand").
    pub attribution_label: String,

    pub image_source: ImageSource,

    /// Deadline for a whole generation, including image enrichment.
    pub deadline_seconds: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            item_count: constants::limits::DEFAULT_ITEM_COUNT,
            item_kind: "books".to_string(),
            attribution_label: "author".to_string(),
            image_source: ImageSource::Lookup,
            deadline_seconds: constants::intervals::GENERATION_DEADLINE.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// When unset, generation answers with a fixed demo payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,

    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BooksConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,

    /// Image link fields to try, in order.
    pub image_preference: Vec<String>,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/books/v1".to_string(),
            image_preference: constants::IMAGE_PREFERENCE
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateConfig {
    pub tag: String,

    /// Tag rewritten to `tag` by the retag job.
    pub legacy_tag: String,

    pub marketplace_search_url: String,

    pub placeholder_base: String,
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            tag: constants::affiliate::DEFAULT_TAG.to_string(),
            legacy_tag: constants::affiliate::LEGACY_TAG.to_string(),
            marketplace_search_url: constants::affiliate::MARKETPLACE_SEARCH_URL.to_string(),
            placeholder_base: constants::placeholder::COVER_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub content_path: String,

    pub site_url: String,

    /// Pause between cover lookups in the refresh job, in milliseconds.
    pub cover_refresh_pause_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            content_path: "data/content.json".to_string(),
            site_url: "https://bibliophile-ai.vercel.app".to_string(),
            cover_refresh_pause_ms: u64::try_from(
                constants::intervals::COVER_REFRESH_PAUSE.as_millis(),
            )
            .unwrap_or(200),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            generator: GeneratorConfig::default(),
            openai: OpenAiConfig::default(),
            books: BooksConfig::default(),
            affiliate: AffiliateConfig::default(),
            catalog: CatalogConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and process
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.clear_blank_credentials();
        Ok(config)
    }

    /// Credentials and the affiliate tag may come from the environment.
    /// Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(constants::env::OPENAI_API_KEY) {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = non_empty(constants::env::GOOGLE_BOOKS_API_KEY) {
            self.books.api_key = Some(key);
        }
        if let Some(tag) = non_empty(constants::env::AMAZON_TAG) {
            self.affiliate.tag = tag;
        }

        self.clear_blank_credentials();
    }

    /// A blank key in the file means no key at all.
    fn clear_blank_credentials(&mut self) {
        let present = |k: &String| !k.trim().is_empty();
        self.openai.api_key = self.openai.api_key.take().filter(present);
        self.books.api_key = self.books.api_key.take().filter(present);
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("bibliophile").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".bibliophile").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.generator.item_count == 0 {
            anyhow::bail!("generator.item_count must be > 0");
        }

        if self.generator.deadline_seconds == 0 {
            anyhow::bail!("generator.deadline_seconds must be > 0");
        }

        if self.books.image_preference.is_empty() {
            anyhow::bail!("books.image_preference cannot be empty");
        }

        if self.affiliate.tag.trim().is_empty() {
            anyhow::bail!("affiliate.tag cannot be empty");
        }

        url::Url::parse(&self.openai.base_url).context("Invalid openai.base_url")?;
        url::Url::parse(&self.books.base_url).context("Invalid books.base_url")?;
        url::Url::parse(&self.affiliate.marketplace_search_url)
            .context("Invalid affiliate.marketplace_search_url")?;

        Ok(())
    }
}
