//! Tracklist endpoints
//!
//! Albums and playlists share one collection; `?type=album|playlist`
//! narrows the list.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use owa_common::db::{artists, members, tracklists, Page, PageRequest};
use owa_common::models::{Artist, ArtistId, Owner, Tracklist, TracklistId, TracklistKind};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::params::{listing, single, ListQuery};
use crate::links::{self, Links};
use crate::views::{
    format_length, ArtistRef, MemberRef, OwnerView, TrackSummary, TracklistSummary, TracklistView,
};
use crate::{ApiError, ApiResult, AppState};

/// `?page=&limit=&type=`
#[derive(Debug, Default, Deserialize)]
pub struct TracklistQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TracklistQuery {
    fn page_request(&self) -> PageRequest {
        ListQuery {
            page: self.page,
            limit: self.limit,
        }
        .page_request()
    }
}

/// GET /tracklist
pub async fn list_tracklists(
    State(state): State<AppState>,
    Query(query): Query<TracklistQuery>,
) -> ApiResult<Json<Value>> {
    let kind = match query.kind.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(TracklistKind::parse(&raw.to_lowercase()).ok_or_else(|| {
            ApiError::BadRequest(format!("Unknown tracklist type: {}", raw))
        })?),
    };
    let page = tracklists::list_tracklists(&state.db, kind, query.page_request()).await?;

    let mut summaries = Vec::with_capacity(page.items.len());
    for tracklist in &page.items {
        summaries.push(TracklistSummary {
            id: tracklist.id.to_string(),
            name: tracklist.name.clone(),
            kind: tracklist.kind(),
            owner: owner_view(&state.db, tracklist, &state.base_url).await?,
            links: Links::resource(&state.base_url, links::TRACKLISTS, tracklist.id),
        });
    }

    listing(
        "tracklists",
        Page {
            items: summaries,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        },
    )
}

/// GET /tracklist/:id
///
/// Tracks come back in position order with the total length.
pub async fn get_tracklist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let tracklist_id = TracklistId::parse(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid tracklist id: {}", id)))?;

    let tracklist = tracklists::find_tracklist_by_id(&state.db, tracklist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tracklist {}", id)))?;
    let base = state.base_url.as_str();

    let entries = tracklists::tracks_of(&state.db, tracklist.id).await?;
    let total_length: u64 = entries.iter().map(|(_, t)| u64::from(t.length)).sum();

    // Playlists mix artists; look each one up once
    let mut artist_cache: HashMap<ArtistId, Artist> = HashMap::new();
    let mut tracks = Vec::with_capacity(entries.len());
    for (_, track) in &entries {
        if !artist_cache.contains_key(&track.artist_id) {
            let artist = artists::find_artist_by_id(&state.db, track.artist_id)
                .await?
                .ok_or_else(|| ApiError::Internal(format!("Artist {} missing", track.artist_id)))?;
            artist_cache.insert(track.artist_id, artist);
        }
        if let Some(artist) = artist_cache.get(&track.artist_id) {
            tracks.push(TrackSummary::new(track, artist, base));
        }
    }

    single(
        "tracklist",
        TracklistView {
            id: tracklist.id.to_string(),
            kind: tracklist.kind(),
            owner: owner_view(&state.db, &tracklist, base).await?,
            length: format_length(total_length),
            links: Links::resource(base, links::TRACKLISTS, tracklist.id),
            name: tracklist.name,
            slug: tracklist.slug,
            tracks,
        },
    )
}

async fn owner_view(db: &SqlitePool, tracklist: &Tracklist, base: &str) -> ApiResult<OwnerView> {
    match tracklist.owner {
        Owner::Artist(id) => {
            let artist = artists::find_artist_by_id(db, id)
                .await?
                .ok_or_else(|| ApiError::Internal(format!("Owner artist {} missing", id)))?;
            Ok(OwnerView::Artist(ArtistRef::new(&artist, base)))
        }
        Owner::Member(id) => {
            let member = members::find_member_by_id(db, id)
                .await?
                .ok_or_else(|| ApiError::Internal(format!("Owner member {} missing", id)))?;
            Ok(OwnerView::Member(MemberRef::new(&member, base)))
        }
    }
}
