//! owa-api library - read-only REST surface over the music library
//!
//! Exposes the router for integration testing; `main.rs` only wires
//! configuration and the listener.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod links;
pub mod views;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// External base URL for resource links, without trailing slash
    pub base_url: String,
}

impl AppState {
    pub fn new(db: SqlitePool, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            db,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/artist", get(api::artists::list_artists))
        .route("/artist/:key", get(api::artists::get_artist))
        .route("/member", get(api::members::list_members))
        .route("/member/:key", get(api::members::get_member))
        .route("/track", get(api::tracks::list_tracks))
        .route("/track/:id", get(api::tracks::get_track))
        .route("/tracklist", get(api::tracklists::list_tracklists))
        .route("/tracklist/:id", get(api::tracklists::get_tracklist))
        .route("/tag", get(api::tags::list_tags))
        .route("/tag/:key", get(api::tags::get_tag))
        .route("/stream/:stream_id", get(api::stream::stream_track))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
