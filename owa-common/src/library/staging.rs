//! Entities waiting to be written by a unit of work

use sqlx::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{artists, members, tags, tracklists, tracks};
use crate::models::{Artist, Member, Tag, Tagging, Track, Tracklist};
use crate::Result;

/// A pending insert. Staged in resolution order, which is also a valid
/// foreign-key order (parents are always resolved before children).
#[derive(Debug, Clone)]
pub enum Staged {
    Artist(Arc<Artist>),
    Member(Arc<Member>),
    Track(Arc<Track>),
    Tracklist(Arc<Tracklist>),
    Tag(Arc<Tag>),
    Tagging(Tagging),
}

impl Staged {
    /// Primary key of the staged entity (taggings have none)
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            Staged::Artist(a) => Some(a.id.0),
            Staged::Member(m) => Some(m.id.0),
            Staged::Track(t) => Some(t.id.0),
            Staged::Tracklist(t) => Some(t.id.0),
            Staged::Tag(t) => Some(t.id.0),
            Staged::Tagging(_) => None,
        }
    }

    pub(crate) async fn write(&self, conn: &mut SqliteConnection) -> Result<()> {
        match self {
            Staged::Artist(artist) => artists::insert_artist(conn, artist).await,
            Staged::Member(member) => members::insert_member(conn, member).await,
            Staged::Track(track) => tracks::insert_track(conn, track).await,
            Staged::Tracklist(tracklist) => tracklists::insert_tracklist(conn, tracklist).await,
            Staged::Tag(tag) => tags::insert_tag(conn, tag).await,
            Staged::Tagging(tagging) => tags::insert_tagging(conn, tagging).await,
        }
    }
}
