use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_slug;
use super::{ApiError, AppState};
use crate::models::{Niche, NicheSummary};

/// `GET /api/niches`
pub async fn list_niches(State(state): State<Arc<AppState>>) -> Json<Vec<NicheSummary>> {
    Json(state.catalog.summaries())
}

/// `GET /api/niches/{slug}`
pub async fn get_niche(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Niche>, ApiError> {
    let slug = validate_slug(&slug)?;

    state
        .catalog
        .find(slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Niche", slug))
}
