//! Unique-entity resolver (find-or-create with identity caching)
//!
//! `find_or_create` hashes the kind-specific subset of the lookup
//! arguments, checks the unit-of-work cache, then storage, and only then
//! constructs and stages a new entity. Within one cache, equal lookups
//! return the same `Arc` (`Arc::ptr_eq`). Across caches nothing is shared;
//! the storage UNIQUE constraints decide which of two racing writers wins.

use sqlx::SqlitePool;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::staging::Staged;
use crate::db::{artists, members, tags, tracklists, tracks};
use crate::models::{
    normalize_tag, Artist, ArtistId, Member, Owner, Tag, Track, Tracklist,
};
use crate::Result;

/// Cache namespace per resolvable entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artist,
    Member,
    Track,
    Tracklist,
    Tag,
}

/// An entity that can be resolved by `find_or_create`
pub trait UniqueEntity: Any + Send + Sync + Sized {
    /// Arguments needed to look up (and if missing, construct) the entity
    type Lookup: Send + Sync;

    const KIND: EntityKind;

    /// Hash key built from the identity-defining subset of the lookup
    fn unique_key(lookup: &Self::Lookup) -> String;

    /// Storage predicate
    fn find(
        pool: &SqlitePool,
        lookup: &Self::Lookup,
    ) -> impl Future<Output = Result<Option<Self>>> + Send;

    fn construct(lookup: Self::Lookup) -> Self;

    fn stage(entity: Arc<Self>) -> Staged;
}

/// Identity map scoped to one unit of work
#[derive(Default)]
pub struct IdentityCache {
    entries: HashMap<(EntityKind, String), Arc<dyn Any + Send + Sync>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<E: UniqueEntity>(&self, key: &str) -> Option<Arc<E>> {
        let hit = self.entries.get(&(E::KIND, key.to_string()))?;
        Arc::clone(hit).downcast::<E>().ok()
    }

    pub fn insert<E: UniqueEntity>(&mut self, key: String, entity: Arc<E>) {
        self.entries.insert((E::KIND, key), entity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resolve an entity through the cache, then storage, then construction
///
/// Newly constructed entities are pushed onto `staged` and are only
/// written when the owning unit of work commits.
pub async fn find_or_create<E: UniqueEntity>(
    pool: &SqlitePool,
    cache: &mut IdentityCache,
    staged: &mut Vec<Staged>,
    lookup: E::Lookup,
) -> Result<Arc<E>> {
    let key = E::unique_key(&lookup);

    if let Some(hit) = cache.get::<E>(&key) {
        return Ok(hit);
    }

    let entity = match E::find(pool, &lookup).await? {
        Some(found) => Arc::new(found),
        None => {
            let created = Arc::new(E::construct(lookup));
            staged.push(E::stage(Arc::clone(&created)));
            debug!(kind = ?E::KIND, key = %key, "Staged new entity");
            created
        }
    };

    cache.insert(key, Arc::clone(&entity));
    Ok(entity)
}

fn join_key(parts: &[&str]) -> String {
    parts.join("\u{1f}")
}

/// Artist lookup: identity is the name
#[derive(Debug, Clone)]
pub struct ArtistKey {
    pub name: String,
}

impl UniqueEntity for Artist {
    type Lookup = ArtistKey;
    const KIND: EntityKind = EntityKind::Artist;

    fn unique_key(lookup: &ArtistKey) -> String {
        lookup.name.clone()
    }

    async fn find(pool: &SqlitePool, lookup: &ArtistKey) -> Result<Option<Self>> {
        artists::find_artist_by_name(pool, &lookup.name).await
    }

    fn construct(lookup: ArtistKey) -> Self {
        Artist::new(lookup.name)
    }

    fn stage(entity: Arc<Self>) -> Staged {
        Staged::Artist(entity)
    }
}

/// Member lookup: identity is the name; email and password are only used
/// when the member has to be created
#[derive(Debug, Clone)]
pub struct MemberKey {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl UniqueEntity for Member {
    type Lookup = MemberKey;
    const KIND: EntityKind = EntityKind::Member;

    fn unique_key(lookup: &MemberKey) -> String {
        lookup.name.clone()
    }

    async fn find(pool: &SqlitePool, lookup: &MemberKey) -> Result<Option<Self>> {
        members::find_member_by_name(pool, &lookup.name).await
    }

    fn construct(lookup: MemberKey) -> Self {
        Member::new(lookup.name, lookup.email, &lookup.password)
    }

    fn stage(entity: Arc<Self>) -> Staged {
        Staged::Member(entity)
    }
}

/// Track lookup: identity is (name, artist, location); length is only used
/// on construction
#[derive(Debug, Clone)]
pub struct TrackKey {
    pub name: String,
    pub artist_id: ArtistId,
    pub length: u32,
    pub location: String,
}

impl UniqueEntity for Track {
    type Lookup = TrackKey;
    const KIND: EntityKind = EntityKind::Track;

    fn unique_key(lookup: &TrackKey) -> String {
        join_key(&[
            &lookup.name,
            &lookup.artist_id.to_string(),
            &lookup.location,
        ])
    }

    async fn find(pool: &SqlitePool, lookup: &TrackKey) -> Result<Option<Self>> {
        tracks::find_track_by_identity(pool, &lookup.name, lookup.artist_id, &lookup.location).await
    }

    fn construct(lookup: TrackKey) -> Self {
        Track::new(lookup.name, lookup.artist_id, lookup.length, lookup.location)
    }

    fn stage(entity: Arc<Self>) -> Staged {
        Staged::Track(entity)
    }
}

/// Album or playlist lookup: identity is the name within its owner
#[derive(Debug, Clone)]
pub struct TracklistKey {
    pub name: String,
    pub owner: Owner,
}

impl UniqueEntity for Tracklist {
    type Lookup = TracklistKey;
    const KIND: EntityKind = EntityKind::Tracklist;

    fn unique_key(lookup: &TracklistKey) -> String {
        let owner = match lookup.owner {
            Owner::Artist(id) => format!("artist:{}", id),
            Owner::Member(id) => format!("member:{}", id),
        };
        join_key(&[&lookup.name, &owner])
    }

    async fn find(pool: &SqlitePool, lookup: &TracklistKey) -> Result<Option<Self>> {
        tracklists::find_tracklist_by_owner(pool, &lookup.name, lookup.owner).await
    }

    fn construct(lookup: TracklistKey) -> Self {
        match lookup.owner {
            Owner::Artist(id) => Tracklist::album(lookup.name, id),
            Owner::Member(id) => Tracklist::playlist(lookup.name, id),
        }
    }

    fn stage(entity: Arc<Self>) -> Staged {
        Staged::Tracklist(entity)
    }
}

/// Tag lookup: identity is the normalized name
#[derive(Debug, Clone)]
pub struct TagKey {
    pub name: String,
}

impl UniqueEntity for Tag {
    type Lookup = TagKey;
    const KIND: EntityKind = EntityKind::Tag;

    fn unique_key(lookup: &TagKey) -> String {
        normalize_tag(&lookup.name)
    }

    async fn find(pool: &SqlitePool, lookup: &TagKey) -> Result<Option<Self>> {
        tags::find_tag_by_name(pool, &lookup.name).await
    }

    fn construct(lookup: TagKey) -> Self {
        Tag::new(&lookup.name)
    }

    fn stage(entity: Arc<Self>) -> Staged {
        Staged::Tag(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[test]
    fn test_track_key_ignores_length() {
        let artist_id = ArtistId::new();
        let a = TrackKey {
            name: "Intro".into(),
            artist_id,
            length: 60,
            location: "/m/a.mp3".into(),
        };
        let b = TrackKey { length: 61, ..a.clone() };
        assert_eq!(Track::unique_key(&a), Track::unique_key(&b));
    }

    #[test]
    fn test_tag_key_is_normalized() {
        let a = TagKey { name: " Black  Metal".into() };
        let b = TagKey { name: "black metal".into() };
        assert_eq!(Tag::unique_key(&a), Tag::unique_key(&b));
    }

    #[test]
    fn test_cache_is_namespaced_by_kind() {
        let mut cache = IdentityCache::new();
        cache.insert("metal".to_string(), Arc::new(Artist::new("metal")));
        assert!(cache.get::<Artist>("metal").is_some());
        assert!(cache.get::<Tag>("metal").is_none());
    }

    #[tokio::test]
    async fn test_find_or_create_returns_identical_instance() {
        let pool = init_in_memory().await.unwrap();
        let mut cache = IdentityCache::new();
        let mut staged = Vec::new();

        let first = find_or_create::<Artist>(
            &pool,
            &mut cache,
            &mut staged,
            ArtistKey { name: "Burzum".into() },
        )
        .await
        .unwrap();
        let second = find_or_create::<Artist>(
            &pool,
            &mut cache,
            &mut staged,
            ArtistKey { name: "Burzum".into() },
        )
        .await
        .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(staged.len(), 1);
    }
}
