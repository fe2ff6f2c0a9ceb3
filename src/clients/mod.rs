//! Outbound API clients.
//!
//! Each upstream sits behind a small trait so the generator can be driven
//! by in-memory fakes in tests.

pub mod google_books;
pub mod openai;

use anyhow::Result;

/// A chat-completion backend that answers with a single JSON document.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one system and one user message and returns the content of the
    /// first choice, or `None` when the upstream returned no content.
    async fn complete_json(&self, system: &str, user: &str) -> Result<Option<String>>;
}

/// A metadata service that can locate a cover image for a title.
#[async_trait::async_trait]
pub trait CoverLookup: Send + Sync {
    /// Returns the best image URL for the first matching volume, if any.
    async fn find_cover(&self, title: &str, author: &str) -> Result<Option<String>>;
}

/// Builds the HTTP client shared by every outbound integration.
pub fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Bibliophile/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}
