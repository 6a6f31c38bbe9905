//! Tag endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use owa_common::db::{tags, LookupKey};
use serde_json::Value;

use super::params::{listing, single, ListQuery};
use crate::links::{self, Links};
use crate::views::{ArtistRef, Counted, TagRef, TagView};
use crate::{ApiError, ApiResult, AppState};

/// GET /tag
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let page = tags::list_tags(&state.db, query.page_request()).await?;
    listing("tags", page.map(|t| TagRef::new(&t, &state.base_url)))
}

/// GET /tag/:key
///
/// Single tag with the artists it was applied to most.
pub async fn get_tag(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let tag = tags::find_tag(&state.db, &LookupKey::parse(&key))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tag {}", key)))?;
    let base = state.base_url.as_str();

    let top_artists = tags::top_artists_for_tag(&state.db, tag.id)
        .await?
        .iter()
        .map(|(artist, count)| Counted {
            item: ArtistRef::new(artist, base),
            count: *count,
        })
        .collect();

    single(
        "tag",
        TagView {
            id: tag.id.to_string(),
            name: tag.name,
            top_artists,
            links: Links::resource(base, links::TAGS, tag.id),
        },
    )
}
