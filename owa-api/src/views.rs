//! JSON representations of library entities
//!
//! Views are plain serializable structs built from domain entities plus the
//! base URL. Member views never include email or credentials.

use owa_common::models::{Artist, Member, Tag, Track, Tracklist, TracklistKind};
use serde::Serialize;

use crate::links::{self, Links};

/// Render a length in seconds as `MM:SS`, or `HH:MM:SS` from one hour up
///
/// ```
/// use owa_api::views::format_length;
///
/// assert_eq!(format_length(0), "00:00");
/// assert_eq!(format_length(263), "04:23");
/// assert_eq!(format_length(3600), "01:00:00");
/// ```
pub fn format_length(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// An item with an occurrence count (top tags, top artists)
#[derive(Debug, Serialize)]
pub struct Counted<T> {
    #[serde(flatten)]
    pub item: T,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
    pub links: Links,
}

impl ArtistRef {
    pub fn new(artist: &Artist, base_url: &str) -> Self {
        Self {
            id: artist.id.to_string(),
            name: artist.name.clone(),
            links: Links::resource(base_url, links::ARTISTS, artist.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberRef {
    pub id: String,
    pub name: String,
    pub links: Links,
}

impl MemberRef {
    pub fn new(member: &Member, base_url: &str) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            links: Links::resource(base_url, links::MEMBERS, member.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
    pub links: Links,
}

impl TagRef {
    pub fn new(tag: &Tag, base_url: &str) -> Self {
        Self {
            id: tag.id.to_string(),
            name: tag.name.clone(),
            links: Links::resource(base_url, links::TAGS, tag.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TracklistRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TracklistKind,
    pub links: Links,
}

impl TracklistRef {
    pub fn new(tracklist: &Tracklist, base_url: &str) -> Self {
        Self {
            id: tracklist.id.to_string(),
            name: tracklist.name.clone(),
            kind: tracklist.kind(),
            links: Links::resource(base_url, links::TRACKLISTS, tracklist.id),
        }
    }
}

/// Tracklist owner, tagged with its type
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OwnerView {
    Artist(ArtistRef),
    Member(MemberRef),
}

#[derive(Debug, Serialize)]
pub struct ArtistView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub albums: Vec<TracklistRef>,
    pub top_tags: Vec<Counted<TagRef>>,
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct MemberView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub playlists: Vec<TracklistRef>,
    pub top_tags: Vec<Counted<TagRef>>,
    pub links: Links,
}

/// Track as shown in lists and inside tracklists
#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub length: String,
    pub artist: ArtistRef,
    pub links: Links,
}

impl TrackSummary {
    pub fn new(track: &Track, artist: &Artist, base_url: &str) -> Self {
        Self {
            id: track.id.to_string(),
            name: track.name.clone(),
            length: format_length(u64::from(track.length)),
            artist: ArtistRef::new(artist, base_url),
            links: track_links(track, base_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub length: String,
    pub artist: ArtistRef,
    pub tracklists: Vec<TracklistRef>,
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct TracklistSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TracklistKind,
    pub owner: OwnerView,
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct TracklistView {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: TracklistKind,
    pub owner: OwnerView,
    pub length: String,
    pub tracks: Vec<TrackSummary>,
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct TagView {
    pub id: String,
    pub name: String,
    pub top_artists: Vec<Counted<ArtistRef>>,
    pub links: Links,
}

pub fn track_links(track: &Track, base_url: &str) -> Links {
    Links::resource(base_url, links::TRACKS, track.id).with_stream(base_url, track.stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owa_common::models::ArtistId;
    use serde_json::json;

    #[test]
    fn test_format_length_boundaries() {
        assert_eq!(format_length(59), "00:59");
        assert_eq!(format_length(3599), "59:59");
        assert_eq!(format_length(3661), "01:01:01");
    }

    #[test]
    fn test_owner_view_is_tagged() {
        let artist = Artist::new("Ulver");
        let value = serde_json::to_value(OwnerView::Artist(ArtistRef::new(&artist, "http://h")))
            .unwrap();
        assert_eq!(value["type"], "artist");
        assert_eq!(value["name"], "Ulver");
        assert_eq!(value["links"]["collection"], json!("http://h/artist"));
    }

    #[test]
    fn test_track_summary_has_stream_link() {
        let artist = Artist::new("Ulver");
        let track = Track::new("Capitel I", ArtistId::new(), 252, "/m/u/01.flac");
        let summary = TrackSummary::new(&track, &artist, "http://h");

        assert_eq!(summary.length, "04:12");
        assert_eq!(
            summary.links.stream.as_deref(),
            Some(format!("http://h/stream/{}", track.stream).as_str())
        );
    }

    #[test]
    fn test_counted_flattens_item() {
        let tag = Tag::new("Folk");
        let counted = Counted {
            item: TagRef::new(&tag, "http://h"),
            count: 3,
        };
        let value = serde_json::to_value(counted).unwrap();
        assert_eq!(value["name"], "folk");
        assert_eq!(value["count"], 3);
    }
}
