//! Artist endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use owa_common::db::{artists, tracklists, LookupKey};
use owa_common::models::{Artist, Owner};
use serde_json::Value;

use super::params::{listing, single, ListQuery};
use crate::links::{self, Links};
use crate::views::{ArtistRef, ArtistView, Counted, TagRef, TracklistRef};
use crate::{ApiError, ApiResult, AppState};

/// GET /artist
///
/// Artists ordered by name.
pub async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let page = artists::list_artists(&state.db, query.page_request()).await?;
    listing("artists", page.map(|a| ArtistRef::new(&a, &state.base_url)))
}

/// GET /artist/:key
///
/// `key` is a guid or a slug.
pub async fn get_artist(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let artist = artists::find_artist(&state.db, &LookupKey::parse(&key))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artist {}", key)))?;

    single("artist", artist_view(&state, artist).await?)
}

async fn artist_view(state: &AppState, artist: Artist) -> ApiResult<ArtistView> {
    let base = state.base_url.as_str();

    let albums = tracklists::tracklists_for_owner(&state.db, Owner::Artist(artist.id))
        .await?
        .iter()
        .map(|album| TracklistRef::new(album, base))
        .collect();

    let top_tags = artists::top_tags_for_artist(&state.db, artist.id)
        .await?
        .iter()
        .map(|(tag, count)| Counted {
            item: TagRef::new(tag, base),
            count: *count,
        })
        .collect();

    Ok(ArtistView {
        id: artist.id.to_string(),
        links: Links::resource(base, links::ARTISTS, artist.id),
        name: artist.name,
        slug: artist.slug,
        bio: artist.bio,
        albums,
        top_tags,
    })
}
