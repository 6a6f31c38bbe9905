//! Library domain model
//!
//! Entities carry client-generated UUIDs so that a staged (not yet
//! persisted) entity already has its identity and can be referenced by
//! other staged entities in the same unit of work.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::credentials::PasswordHash;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from the TEXT form used in storage and URLs
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Artist primary key
    ArtistId
);
entity_id!(
    /// Member primary key
    MemberId
);
entity_id!(
    /// Track primary key
    TrackId
);
entity_id!(
    /// Tracklist (album or playlist) primary key
    TracklistId
);
entity_id!(
    /// Tag primary key
    TagId
);

/// Convert a display name into a URL-safe slug
///
/// Alphanumeric runs are lowercased and joined with `-`.
///
/// ```
/// use owa_common::models::slugify;
///
/// assert_eq!(slugify("Sunn O)))"), "sunn-o");
/// assert_eq!(slugify("  Boards of  Canada "), "boards-of-canada");
/// ```
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize a tag name before uniqueness comparison
///
/// Trims, collapses internal whitespace to a single space and lowercases.
pub fn normalize_tag(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ArtistId::new(),
            slug: slugify(&name),
            name,
            bio: None,
        }
    }
}

/// Member capabilities stored as a bit set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub u32);

impl Permissions {
    pub const STREAM: Permissions = Permissions(0x01);
    pub const TAG: Permissions = Permissions(0x02);
    pub const MODERATE: Permissions = Permissions(0x80);

    pub const fn empty() -> Self {
        Permissions(0)
    }

    pub const fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Permissions) -> Self {
        Permissions(self.0 | other.0)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::STREAM.union(Permissions::TAG)
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        self.union(rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub password: PasswordHash,
    pub bio: Option<String>,
    pub permissions: Permissions,
}

impl Member {
    /// Create a member, hashing the plaintext password with a fresh salt
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        let name = name.into();
        Self {
            id: MemberId::new(),
            slug: slugify(&name),
            name,
            email: email.into(),
            password: PasswordHash::generate(password),
            bio: None,
            permissions: Permissions::default(),
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }

    pub fn can(&self, permission: Permissions) -> bool {
        self.permissions.contains(permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub slug: String,
    pub artist_id: ArtistId,
    /// Length in whole seconds
    pub length: u32,
    /// Absolute path of the audio file
    pub location: String,
    /// Opaque identifier used by the stream endpoint
    pub stream: Uuid,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        artist_id: ArtistId,
        length: u32,
        location: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: TrackId::new(),
            slug: slugify(&name),
            name,
            artist_id,
            length,
            location: location.into(),
            stream: Uuid::new_v4(),
        }
    }
}

/// Concrete tracklist variant, stored in the `kind` discriminator column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracklistKind {
    Album,
    Playlist,
}

impl TracklistKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TracklistKind::Album => "album",
            TracklistKind::Playlist => "playlist",
        }
    }

    pub fn parse(s: &str) -> Option<TracklistKind> {
        match s {
            "album" => Some(TracklistKind::Album),
            "playlist" => Some(TracklistKind::Playlist),
            _ => None,
        }
    }
}

impl fmt::Display for TracklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracklist owner: albums belong to artists, playlists to members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    Artist(ArtistId),
    Member(MemberId),
}

impl Owner {
    pub fn tracklist_kind(&self) -> TracklistKind {
        match self {
            Owner::Artist(_) => TracklistKind::Album,
            Owner::Member(_) => TracklistKind::Playlist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracklist {
    pub id: TracklistId,
    pub name: String,
    pub slug: String,
    pub owner: Owner,
}

impl Tracklist {
    pub fn album(name: impl Into<String>, artist_id: ArtistId) -> Self {
        Self::with_owner(name, Owner::Artist(artist_id))
    }

    pub fn playlist(name: impl Into<String>, member_id: MemberId) -> Self {
        Self::with_owner(name, Owner::Member(member_id))
    }

    fn with_owner(name: impl Into<String>, owner: Owner) -> Self {
        let name = name.into();
        Self {
            id: TracklistId::new(),
            slug: slugify(&name),
            name,
            owner,
        }
    }

    pub fn kind(&self) -> TracklistKind {
        self.owner.tracklist_kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Normalized name, see [`normalize_tag`]
    pub name: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            id: TagId::new(),
            name: normalize_tag(name),
        }
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// A member's tag applied to an artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tagging {
    pub member_id: MemberId,
    pub artist_id: ArtistId,
    pub tag_id: TagId,
}

/// One membership record: a track at a position within a tracklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Membership {
    pub tracklist_id: TracklistId,
    pub track_id: TrackId,
    pub position: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("AC/DC"), "ac-dc");
        assert_eq!(slugify("Godspeed You! Black Emperor"), "godspeed-you-black-emperor");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Black   Metal "), "black metal");
        assert_eq!(normalize_tag("Folk"), normalize_tag("folk"));
    }

    #[test]
    fn test_owner_determines_kind() {
        let artist = ArtistId::new();
        let member = MemberId::new();
        assert_eq!(Tracklist::album("x", artist).kind(), TracklistKind::Album);
        assert_eq!(Tracklist::playlist("x", member).kind(), TracklistKind::Playlist);
    }

    #[test]
    fn test_tracklist_kind_round_trip() {
        for kind in [TracklistKind::Album, TracklistKind::Playlist] {
            assert_eq!(TracklistKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TracklistKind::parse("mixtape"), None);
    }

    #[test]
    fn test_default_permissions() {
        let member = Member::new("user123", "123@bar.com", "1234");
        assert!(member.can(Permissions::STREAM));
        assert!(member.can(Permissions::TAG));
        assert!(!member.can(Permissions::MODERATE));
    }

    #[test]
    fn test_member_password_verify() {
        let member = Member::new("catlover", "cat@bar.com", "cat");
        assert!(member.verify_password("cat"));
        assert!(!member.verify_password("asfasg"));
    }
}
