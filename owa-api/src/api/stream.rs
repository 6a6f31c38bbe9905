//! Audio byte-stream endpoint
//!
//! Tracks are addressed by their opaque stream id, never by file path.
//! `ServeFile` handles range requests and content type detection.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
};
use owa_common::db::tracks;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState};

/// GET /stream/:stream_id
pub async fn stream_track(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let not_found = || ApiError::NotFound(format!("Stream {}", stream_id));

    let stream = Uuid::parse_str(&stream_id).map_err(|_| not_found())?;
    let track = tracks::find_track_by_stream(&state.db, stream)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!(track = %track.name, location = %track.location, "Streaming");

    let response = match ServeFile::new(&track.location).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    Ok(response.map(Body::new))
}
