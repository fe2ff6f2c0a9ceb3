use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::constants::TOPIC_REQUIRED;
use crate::models::{GenerationRequest, GenerationResponse};

/// `POST /api/generate`
///
/// An unreadable body is treated like a missing topic.
pub async fn generate_collection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected generate body: {}", rejection);
            return Err(ApiError::validation(TOPIC_REQUIRED));
        }
    };

    let response = state.generator.generate(request.topic.as_deref()).await?;
    Ok(Json(response))
}
