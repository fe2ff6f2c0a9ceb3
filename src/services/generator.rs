//! Recommendation generation: prompt the model, parse its list, enrich each
//! item with a cover and an affiliate link.

use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use super::image::ImageResolver;
use super::links::purchase_link;
use crate::clients::google_books::GoogleBooksClient;
use crate::clients::openai::OpenAiClient;
use crate::clients::{CompletionClient, CoverLookup};
use crate::config::{AffiliateConfig, Config, GeneratorConfig};
use crate::constants::limits::MAX_TOPIC_CHARS;
use crate::models::{DraftItem, GenerationResponse, Niche, RecommendedItem};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Malformed model response: {0}")]
    UpstreamMalformedResponse(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("No generation credential configured")]
    Unavailable,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompletionPayload {
    Wrapped(WrappedItems),
    Bare(Vec<DraftItem>),
}

#[derive(Deserialize)]
struct WrappedItems {
    #[serde(alias = "items", alias = "products")]
    books: Vec<DraftItem>,
}

pub struct RecommendationGenerator {
    completion: Option<Arc<dyn CompletionClient>>,
    images: ImageResolver,
    affiliate: AffiliateConfig,
    settings: GeneratorConfig,
}

impl RecommendationGenerator {
    /// `completion` is `None` when no credential is configured; generation
    /// then answers with the demo payload.
    #[must_use]
    pub fn new(
        config: &Config,
        completion: Option<Arc<dyn CompletionClient>>,
        lookup: Option<Arc<dyn CoverLookup>>,
    ) -> Self {
        Self {
            completion,
            images: ImageResolver::new(
                config.generator.image_source,
                lookup,
                config.affiliate.placeholder_base.clone(),
            ),
            affiliate: config.affiliate.clone(),
            settings: config.generator.clone(),
        }
    }

    /// Wires the real upstream clients over a shared HTTP client.
    #[must_use]
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let completion = OpenAiClient::from_config(http.clone(), &config.openai)
            .map(|c| Arc::new(c) as Arc<dyn CompletionClient>);
        let lookup = Arc::new(GoogleBooksClient::with_shared_client(http, &config.books))
            as Arc<dyn CoverLookup>;
        Self::new(config, completion, Some(lookup))
    }

    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.completion.is_none()
    }

    /// Generates an enriched list for a free-text topic.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::InvalidRequest`] for a missing, blank or oversized topic
    /// - [`GenerationError::UpstreamMalformedResponse`] when the model output
    ///   does not hold a non-empty item list
    /// - [`GenerationError::GenerationFailed`] for upstream failures or when
    ///   the deadline elapses
    pub async fn generate(&self, topic: Option<&str>) -> Result<GenerationResponse, GenerationError> {
        let topic = validate_topic(topic)?;

        let Some(completion) = &self.completion else {
            info!("No generation credential, serving demo payload");
            return Ok(GenerationResponse::demo());
        };

        let system = system_prompt(&self.settings.item_kind);
        let user = topic_prompt(
            topic,
            self.settings.item_count,
            &self.settings.item_kind,
            &self.settings.attribution_label,
        );

        let result = self.run_with_deadline(completion.as_ref(), &system, &user).await;
        record_outcome(&result);

        let books = result?;
        info!(topic = %topic, items = books.len(), "Generated collection");
        Ok(GenerationResponse { books })
    }

    /// Generates `count` items for a catalog niche, favouring lesser-known picks.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Unavailable`] without a credential, otherwise
    /// the same errors as [`Self::generate`].
    pub async fn generate_for_niche(
        &self,
        niche: &Niche,
        count: usize,
    ) -> Result<Vec<RecommendedItem>, GenerationError> {
        let completion = self.completion.as_ref().ok_or(GenerationError::Unavailable)?;

        let system = system_prompt(&self.settings.item_kind);
        let user = niche_prompt(
            niche,
            count,
            &self.settings.item_kind,
            &self.settings.attribution_label,
        );

        let result = self.run_with_deadline(completion.as_ref(), &system, &user).await;
        record_outcome(&result);
        result
    }

    async fn run_with_deadline(
        &self,
        completion: &dyn CompletionClient,
        system: &str,
        user: &str,
    ) -> Result<Vec<RecommendedItem>, GenerationError> {
        let deadline = Duration::from_secs(self.settings.deadline_seconds);

        tokio::time::timeout(deadline, self.run(completion, system, user))
            .await
            .map_err(|_| {
                GenerationError::GenerationFailed(format!(
                    "deadline of {}s exceeded",
                    deadline.as_secs()
                ))
            })?
    }

    async fn run(
        &self,
        completion: &dyn CompletionClient,
        system: &str,
        user: &str,
    ) -> Result<Vec<RecommendedItem>, GenerationError> {
        let content = completion
            .complete_json(system, user)
            .await
            .map_err(|e| GenerationError::GenerationFailed(format!("{e:#}")))?
            .ok_or_else(|| {
                GenerationError::UpstreamMalformedResponse("completion had no content".to_string())
            })?;

        let drafts = parse_drafts(&content)?;
        Ok(self.enrich(drafts).await)
    }

    /// Resolves images concurrently; output order follows `drafts`.
    pub async fn enrich(&self, drafts: Vec<DraftItem>) -> Vec<RecommendedItem> {
        join_all(drafts.into_iter().map(|draft| async move {
            let image_url = self.images.resolve(&draft.title, &draft.author).await;
            let amazon_link = purchase_link(&self.affiliate, &draft.title, &draft.author);
            RecommendedItem::from_draft(draft, image_url, amazon_link)
        }))
        .await
    }
}

fn record_outcome<T>(result: &Result<T, GenerationError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(GenerationError::UpstreamMalformedResponse(msg)) => {
            error!("Model returned an unusable response: {}", msg);
            "malformed"
        }
        Err(GenerationError::GenerationFailed(msg)) => {
            error!("Generation failed: {}", msg);
            "failed"
        }
        Err(e) => {
            warn!("Generation rejected: {}", e);
            "rejected"
        }
    };
    metrics::counter!("generation_total", "outcome" => outcome).increment(1);
}

/// Trims the topic and enforces presence and length.
pub fn validate_topic(topic: Option<&str>) -> Result<&str, GenerationError> {
    let trimmed = topic.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(GenerationError::InvalidRequest(
            crate::constants::TOPIC_REQUIRED.to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_TOPIC_CHARS {
        return Err(GenerationError::InvalidRequest(format!(
            "Topic must be {MAX_TOPIC_CHARS} characters or less"
        )));
    }

    Ok(trimmed)
}

/// Extracts the item list from the model's JSON. Accepts `{"books": [...]}`
/// (or `items`/`products`) and a bare array.
pub fn parse_drafts(content: &str) -> Result<Vec<DraftItem>, GenerationError> {
    let payload: CompletionPayload = serde_json::from_str(content).map_err(|e| {
        GenerationError::UpstreamMalformedResponse(format!("unexpected shape: {e}"))
    })?;

    let drafts = match payload {
        CompletionPayload::Wrapped(w) => w.books,
        CompletionPayload::Bare(items) => items,
    };

    if drafts.is_empty() {
        return Err(GenerationError::UpstreamMalformedResponse(
            "item list is empty".to_string(),
        ));
    }

    if let Some(position) = drafts.iter().position(|d| {
        d.title.trim().is_empty() || d.author.trim().is_empty() || d.description.trim().is_empty()
    }) {
        return Err(GenerationError::UpstreamMalformedResponse(format!(
            "item {position} has an empty field"
        )));
    }

    Ok(drafts)
}

fn system_prompt(kind: &str) -> String {
    format!(
        "You are an expert curator of {kind}. You recommend high quality {kind} for a named \
         niche, including hidden gems, not just the obvious ones."
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn response_shape(label: &str) -> String {
    format!(
        r#"{{
  "books": [
    {{
      "title": "Title",
      "{label}": "{}",
      "description": "Reason"
    }}
  ]
}}"#,
        capitalize(label)
    )
}

fn topic_prompt(topic: &str, count: usize, kind: &str, label: &str) -> String {
    format!(
        "Recommend {count} specific, high-quality {kind} for the niche topic: \"{topic}\".\n\n\
         For each, provide:\n\
         - Title\n\
         - {}\n\
         - A convincing 2-sentence reason for this specific audience.\n\n\
         Return ONLY valid JSON in this format:\n{}",
        capitalize(label),
        response_shape(label)
    )
}

fn niche_prompt(niche: &Niche, count: usize, kind: &str, label: &str) -> String {
    let gems = count.saturating_sub(1);
    format!(
        "Recommend {count} distinct {kind} for the niche: \"{}\".\n\
         The audience is: {}.\n\n\
         IMPORTANT: The audience wants offbeat choices. Select 1 fundamental classic and \
         {gems} hidden gems or underrated picks that are surprisingly excellent but less famous. \
         Avoid the most obvious top-of-the-charts bestsellers.\n\n\
         For each, give a 2-sentence persuasive reason why this specific audience should \
         care.\n\n\
         Return ONLY valid JSON in this format:\n{}",
        niche.title,
        niche.description,
        response_shape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedCompletion {
        reply: anyhow::Result<Option<String>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn ok(body: &str) -> Self {
            Self::with(Ok(Some(body.to_string())))
        }

        fn with(reply: anyhow::Result<Option<String>>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn complete_json(&self, _system: &str, user: &str) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(user.to_string());
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    /// Completes later for earlier titles so completion order is reversed.
    struct SlowFirstLookup;

    #[async_trait::async_trait]
    impl CoverLookup for SlowFirstLookup {
        async fn find_cover(&self, title: &str, _author: &str) -> anyhow::Result<Option<String>> {
            let delay = match title {
                "One" => 60,
                "Two" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if title == "Two" {
                anyhow::bail!("lookup exploded");
            }
            Ok(Some(format!("http://covers/{title}.jpg")))
        }
    }

    const THREE_ITEMS: &str = r#"{"books":[
        {"title":"One","author":"A1","description":"D1"},
        {"title":"Two","author":"A2","description":"D2"},
        {"title":"Three","author":"A3","description":"D3"}
    ]}"#;

    fn generator(completion: Option<Arc<dyn CompletionClient>>) -> RecommendationGenerator {
        RecommendationGenerator::new(
            &Config::default(),
            completion,
            Some(Arc::new(SlowFirstLookup)),
        )
    }

    #[test]
    fn test_validate_topic() {
        assert_eq!(validate_topic(Some("  stoicism  ")).unwrap(), "stoicism");
        assert!(matches!(
            validate_topic(None),
            Err(GenerationError::InvalidRequest(_))
        ));
        assert!(validate_topic(Some("")).is_err());
        assert!(validate_topic(Some(" \t\n ")).is_err());
        assert!(validate_topic(Some(&"x".repeat(200))).is_ok());
        assert!(validate_topic(Some(&"x".repeat(201))).is_err());
    }

    #[test]
    fn test_parse_drafts_shapes() {
        assert_eq!(parse_drafts(THREE_ITEMS).unwrap().len(), 3);

        let bare = r#"[{"title":"T","brand":"B","description":"D"}]"#;
        assert_eq!(parse_drafts(bare).unwrap()[0].author, "B");

        let items_key = r#"{"items":[{"title":"T","author":"A","description":"D"}]}"#;
        assert_eq!(parse_drafts(items_key).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_drafts_rejects_malformed() {
        for body in [
            "not json",
            "{}",
            r#"{"books":[]}"#,
            r#"{"books":"nope"}"#,
            r#"{"books":[{"title":"T","description":"D"}]}"#,
            r#"{"books":[{"title":" ","author":"A","description":"D"}]}"#,
        ] {
            assert!(
                matches!(
                    parse_drafts(body),
                    Err(GenerationError::UpstreamMalformedResponse(_))
                ),
                "expected malformed for {body}"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_topic_makes_no_call() {
        let completion = Arc::new(ScriptedCompletion::ok(THREE_ITEMS));
        let g = generator(Some(completion.clone()));

        let err = g.generate(Some("   ")).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_configured_key_is_demo() {
        let config: Config = toml::from_str("[openai]\napi_key = \"\"").unwrap();
        let g = RecommendationGenerator::from_config(&config, reqwest::Client::new());
        assert!(g.is_demo());
    }

    #[tokio::test]
    async fn test_demo_without_credential() {
        let g = generator(None);
        assert!(g.is_demo());

        let response = g.generate(Some("woodworking")).await.unwrap();
        assert_eq!(response, GenerationResponse::demo());
        assert_eq!(response.books.len(), 1);
    }

    #[tokio::test]
    async fn test_order_preserved_and_lookup_failure_absorbed() {
        let completion = Arc::new(ScriptedCompletion::ok(THREE_ITEMS));
        let g = generator(Some(completion.clone()));

        let response = g.generate(Some("sci-fi")).await.unwrap();
        let titles: Vec<_> = response.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two", "Three"]);

        assert_eq!(response.books[0].image_url, "https://covers/One.jpg");
        assert_eq!(
            response.books[1].image_url,
            "https://placehold.co/400x600/e2e8f0/475569?text=Two"
        );
        assert_eq!(response.books[2].image_url, "https://covers/Three.jpg");

        for book in &response.books {
            assert!(!book.image_url.starts_with("http://"));
            assert!(book.amazon_link.contains(&format!(
                "k={}%20{}",
                book.author, book.title
            )));
            assert!(book.amazon_link.ends_with("&tag=busybibliophi-20"));
            assert!(!book.description.is_empty());
        }

        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Recommend 6 specific"));
        assert!(prompts[0].contains("\"sci-fi\""));
    }

    #[tokio::test]
    async fn test_upstream_error_is_generation_failed() {
        let completion = Arc::new(ScriptedCompletion::with(Err(anyhow::anyhow!("timeout"))));
        let g = generator(Some(completion));

        let err = g.generate(Some("poetry")).await.unwrap_err();
        assert!(matches!(err, GenerationError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_completion_is_malformed() {
        let completion = Arc::new(ScriptedCompletion::with(Ok(None)));
        let g = generator(Some(completion));

        let err = g.generate(Some("poetry")).await.unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamMalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        struct Hanging;

        #[async_trait::async_trait]
        impl CompletionClient for Hanging {
            async fn complete_json(&self, _s: &str, _u: &str) -> anyhow::Result<Option<String>> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }

        let mut config = Config::default();
        config.generator.deadline_seconds = 1;
        let g = RecommendationGenerator::new(&config, Some(Arc::new(Hanging)), None);

        let err = g.generate(Some("chess")).await.unwrap_err();
        assert!(matches!(err, GenerationError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_generate_for_niche() {
        let completion = Arc::new(ScriptedCompletion::ok(THREE_ITEMS));
        let g = generator(Some(completion.clone()));
        let niche = Niche {
            slug: "space".to_string(),
            title: "Space Opera".to_string(),
            description: "Readers who loved Dune".to_string(),
            books: vec![],
        };

        let items = g.generate_for_niche(&niche, 3).await.unwrap();
        assert_eq!(items.len(), 3);

        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Space Opera"));
        assert!(prompts[0].contains("Readers who loved Dune"));
        assert!(prompts[0].contains("2 hidden gems"));

        assert!(matches!(
            generator(None).generate_for_niche(&niche, 3).await,
            Err(GenerationError::Unavailable)
        ));
    }

    #[test]
    fn test_response_shape_uses_label() {
        let shape = response_shape("brand");
        assert!(shape.contains("\"brand\": \"Brand\""));
    }
}
