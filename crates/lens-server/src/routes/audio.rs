//! Stored audio serving
//!
//! The one route that answers with raw bytes instead of the JSON
//! envelope. Expired blobs look exactly like missing ones.

use axum::extract::{Path, State};
use axum::response::Response;
use http::{HeaderValue, StatusCode, header};
use lens_api::{ApiError, require_id};

use crate::state::AppState;

use super::store_error;

/// `GET /api/audio/{id}`
pub async fn serve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_id(&id, "audioId")?;

    let blob = state
        .inner
        .blobs
        .retrieve(&id)
        .await
        .map_err(|e| store_error(e, "audio retrieval"))?
        .ok_or_else(|| ApiError::not_found_with_id("audio file", &id))?;

    let content_type = HeaderValue::from_str(&blob.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("audio/mpeg"));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, blob.payload.len())
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .header(header::ACCEPT_RANGES, "bytes")
        .body(axum::body::Body::from(blob.payload))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("building audio response: {e}")))?;

    Ok(response)
}
