use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::build_http_client;
use crate::config::Config;
use crate::models::Catalog;
use crate::services::{CatalogStore, RecommendationGenerator};

mod catalog;
mod error;
mod generate;
mod observability;
mod sitemap;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Arc<Config>,

    pub generator: Arc<RecommendationGenerator>,

    /// Read-only snapshot of the content document taken at startup.
    pub catalog: Arc<Catalog>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Config,
        generator: RecommendationGenerator,
        catalog: Catalog,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generator: Arc::new(generator),
            catalog: Arc::new(catalog),
            start_time: std::time::Instant::now(),
            prometheus_handle,
        }
    }
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let http = build_http_client(config.general.request_timeout_seconds)?;
    let generator = RecommendationGenerator::from_config(&config, http);

    if generator.is_demo() {
        tracing::warn!("OPENAI_API_KEY is not set, /api/generate will serve demo data");
    }

    let catalog = CatalogStore::new(&config.catalog.content_path)
        .load_or_default()
        .await?;
    tracing::info!(niches = catalog.niches.len(), "Catalog loaded");

    Ok(Arc::new(AppState::new(
        config,
        generator,
        catalog,
        prometheus_handle,
    )))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config.server.cors_allowed_origins;

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = Router::new()
        .route("/generate", post(generate::generate_collection))
        .route("/niches", get(catalog::list_niches))
        .route("/niches/{slug}", get(catalog::get_niche));

    Router::new()
        .nest("/api", api_router)
        .route("/sitemap.xml", get(sitemap::get_sitemap))
        .route("/healthz", get(system::get_health))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
