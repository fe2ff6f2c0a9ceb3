use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::sitemap;

/// `GET /sitemap.xml`
pub async fn get_sitemap(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let entries = sitemap::build_entries(
        &state.catalog,
        &state.config.catalog.site_url,
        chrono::Utc::now(),
    );
    let xml = sitemap::render(&entries)?;

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
