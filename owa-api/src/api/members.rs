//! Member endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use owa_common::db::{members, tracklists, LookupKey};
use owa_common::models::Owner;
use serde_json::Value;

use super::params::{listing, single, ListQuery};
use crate::links::{self, Links};
use crate::views::{Counted, MemberRef, MemberView, TagRef, TracklistRef};
use crate::{ApiError, ApiResult, AppState};

/// GET /member
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let page = members::list_members(&state.db, query.page_request()).await?;
    listing("members", page.map(|m| MemberRef::new(&m, &state.base_url)))
}

/// GET /member/:key
///
/// Single member with playlists and the tags they applied most.
pub async fn get_member(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let member = members::find_member(&state.db, &LookupKey::parse(&key))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Member {}", key)))?;
    let base = state.base_url.as_str();

    let playlists = tracklists::tracklists_for_owner(&state.db, Owner::Member(member.id))
        .await?
        .iter()
        .map(|playlist| TracklistRef::new(playlist, base))
        .collect();

    let top_tags = members::top_tags_for_member(&state.db, member.id)
        .await?
        .iter()
        .map(|(tag, count)| Counted {
            item: TagRef::new(tag, base),
            count: *count,
        })
        .collect();

    single(
        "member",
        MemberView {
            id: member.id.to_string(),
            links: Links::resource(base, links::MEMBERS, member.id),
            name: member.name,
            slug: member.slug,
            bio: member.bio,
            playlists,
            top_tags,
        },
    )
}
