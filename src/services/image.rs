use std::sync::Arc;
use tracing::{debug, warn};

use super::links::{placeholder_image, upgrade_to_https};
use crate::clients::CoverLookup;
use crate::config::ImageSource;

/// Resolves a display image for an item. Never fails: any lookup problem
/// degrades to the title placeholder.
#[derive(Clone)]
pub struct ImageResolver {
    source: ImageSource,
    lookup: Option<Arc<dyn CoverLookup>>,
    placeholder_base: String,
}

impl ImageResolver {
    #[must_use]
    pub fn new(
        source: ImageSource,
        lookup: Option<Arc<dyn CoverLookup>>,
        placeholder_base: impl Into<String>,
    ) -> Self {
        Self {
            source,
            lookup,
            placeholder_base: placeholder_base.into(),
        }
    }

    /// Always returns an https URL.
    pub async fn resolve(&self, title: &str, author: &str) -> String {
        let found = match (self.source, &self.lookup) {
            (ImageSource::Lookup, Some(lookup)) => lookup_cover(lookup.as_ref(), title, author).await,
            _ => None,
        };

        let url = found.unwrap_or_else(|| placeholder_image(&self.placeholder_base, title));
        upgrade_to_https(&url)
    }
}

/// Looks up a cover and absorbs errors, recording the outcome.
pub async fn lookup_cover(lookup: &dyn CoverLookup, title: &str, author: &str) -> Option<String> {
    match lookup.find_cover(title, author).await {
        Ok(Some(url)) => {
            metrics::counter!("cover_lookup_total", "outcome" => "found").increment(1);
            Some(url)
        }
        Ok(None) => {
            debug!(title = %title, "No cover found");
            metrics::counter!("cover_lookup_total", "outcome" => "missing").increment(1);
            None
        }
        Err(e) => {
            warn!(title = %title, error = %e, "Cover lookup failed, using placeholder");
            metrics::counter!("cover_lookup_total", "outcome" => "error").increment(1);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLookup(anyhow::Result<Option<String>>);

    #[async_trait::async_trait]
    impl CoverLookup for FixedLookup {
        async fn find_cover(&self, _title: &str, _author: &str) -> anyhow::Result<Option<String>> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn resolver(source: ImageSource, result: anyhow::Result<Option<String>>) -> ImageResolver {
        ImageResolver::new(
            source,
            Some(Arc::new(FixedLookup(result))),
            "https://placehold.co/400x600",
        )
    }

    #[tokio::test]
    async fn test_lookup_result_is_upgraded() {
        let r = resolver(ImageSource::Lookup, Ok(Some("http://covers/1.jpg".to_string())));
        assert_eq!(r.resolve("Dune", "Herbert").await, "https://covers/1.jpg");
    }

    #[tokio::test]
    async fn test_lookup_error_falls_back_to_placeholder() {
        let r = resolver(ImageSource::Lookup, Err(anyhow::anyhow!("connection reset")));
        assert_eq!(
            r.resolve("Dune", "Herbert").await,
            "https://placehold.co/400x600?text=Dune"
        );
    }

    #[tokio::test]
    async fn test_lookup_miss_falls_back_to_placeholder() {
        let r = resolver(ImageSource::Lookup, Ok(None));
        assert_eq!(
            r.resolve("Dune", "Herbert").await,
            "https://placehold.co/400x600?text=Dune"
        );
    }

    #[tokio::test]
    async fn test_placeholder_source_skips_lookup() {
        let r = resolver(
            ImageSource::Placeholder,
            Ok(Some("https://covers/1.jpg".to_string())),
        );
        assert_eq!(
            r.resolve("Mechanical Keyboard", "Keychron").await,
            "https://placehold.co/400x600?text=Mechanical%20Keyboard"
        );
    }
}
