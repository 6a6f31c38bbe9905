//! Track endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use owa_common::db::{tracklists, tracks};
use owa_common::models::TrackId;
use serde_json::Value;

use super::params::{listing, single, ListQuery};
use crate::views::{format_length, track_links, ArtistRef, TrackSummary, TrackView, TracklistRef};
use crate::{ApiError, ApiResult, AppState};

/// GET /track
///
/// Tracks ordered by name, then artist name.
pub async fn list_tracks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let page = tracks::list_tracks(&state.db, query.page_request()).await?;
    listing(
        "tracks",
        page.map(|(track, artist)| TrackSummary::new(&track, &artist, &state.base_url)),
    )
}

/// GET /track/:id
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let track_id = TrackId::parse(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid track id: {}", id)))?;

    let (track, artist) = tracks::find_track_with_artist(&state.db, track_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Track {}", id)))?;
    let base = state.base_url.as_str();

    let containing = tracklists::tracklists_of(&state.db, track.id)
        .await?
        .iter()
        .map(|tracklist| TracklistRef::new(tracklist, base))
        .collect();

    single(
        "track",
        TrackView {
            id: track.id.to_string(),
            links: track_links(&track, base),
            length: format_length(u64::from(track.length)),
            artist: ArtistRef::new(&artist, base),
            tracklists: containing,
            name: track.name,
            slug: track.slug,
        },
    )
}
