//! Unit of work
//!
//! Holds the identity cache, staged inserts and loaded tracklist ledgers for
//! one ingestion batch or request. Reads go straight to the pool; the only
//! transaction is the one opened by [`UnitOfWork::commit`]. Dropping a unit
//! of work without committing discards everything it staged.

use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::ledger::Ledger;
use super::resolver::{
    self, ArtistKey, IdentityCache, MemberKey, TagKey, TrackKey, TracklistKey, UniqueEntity,
};
use super::staging::Staged;
use crate::db::{tracklists, tracks};
use crate::models::{
    Artist, Member, Owner, Tag, Tagging, Track, TrackId, Tracklist, TracklistId,
};
use crate::{Error, Result};

/// What a successful commit wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub entities_inserted: usize,
    pub ledgers_written: usize,
}

pub struct UnitOfWork {
    pool: SqlitePool,
    cache: IdentityCache,
    staged: Vec<Staged>,
    ledgers: HashMap<TracklistId, Ledger>,
}

impl UnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: IdentityCache::new(),
            staged: Vec::new(),
            ledgers: HashMap::new(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Generic find-or-create through this unit's identity cache
    pub async fn find_or_create<E: UniqueEntity>(&mut self, lookup: E::Lookup) -> Result<Arc<E>> {
        resolver::find_or_create(&self.pool, &mut self.cache, &mut self.staged, lookup).await
    }

    pub async fn artist(&mut self, name: &str) -> Result<Arc<Artist>> {
        self.find_or_create(ArtistKey {
            name: name.to_string(),
        })
        .await
    }

    pub async fn member(&mut self, name: &str, email: &str, password: &str) -> Result<Arc<Member>> {
        self.find_or_create(MemberKey {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn album(&mut self, name: &str, artist: &Artist) -> Result<Arc<Tracklist>> {
        self.find_or_create(TracklistKey {
            name: name.to_string(),
            owner: Owner::Artist(artist.id),
        })
        .await
    }

    pub async fn playlist(&mut self, name: &str, member: &Member) -> Result<Arc<Tracklist>> {
        self.find_or_create(TracklistKey {
            name: name.to_string(),
            owner: Owner::Member(member.id),
        })
        .await
    }

    pub async fn track(
        &mut self,
        name: &str,
        artist: &Artist,
        length: u32,
        location: &str,
    ) -> Result<Arc<Track>> {
        self.find_or_create(TrackKey {
            name: name.to_string(),
            artist_id: artist.id,
            length,
            location: location.to_string(),
        })
        .await
    }

    pub async fn tag(&mut self, name: &str) -> Result<Arc<Tag>> {
        self.find_or_create(TagKey {
            name: name.to_string(),
        })
        .await
    }

    /// Stage a member's tag on an artist. A duplicate triple is rejected by
    /// storage when the unit commits.
    pub fn tag_artist(&mut self, member: &Member, artist: &Artist, tag: &Tag) {
        self.staged.push(Staged::Tagging(Tagging {
            member_id: member.id,
            artist_id: artist.id,
            tag_id: tag.id,
        }));
    }

    /// True when the entity with this id was created (not found) in this unit
    pub fn is_new(&self, id: Uuid) -> bool {
        self.staged.iter().any(|s| s.entity_id() == Some(id))
    }

    pub fn staged(&self) -> &[Staged] {
        &self.staged
    }

    /// Ledger of a tracklist, loaded from storage on first access
    pub async fn ledger(&mut self, id: TracklistId) -> Result<&mut Ledger> {
        if !self.ledgers.contains_key(&id) {
            let order = tracklists::load_track_order(&self.pool, id).await?;
            self.ledgers.insert(id, Ledger::from_ordered(id, order));
        }

        self.ledgers
            .get_mut(&id)
            .ok_or_else(|| Error::Internal(format!("Ledger for {} not loaded", id)))
    }

    /// Append a track; returns its position
    pub async fn append_track(&mut self, tracklist: &Tracklist, track: &Track) -> Result<usize> {
        Ok(self.ledger(tracklist.id).await?.append(track.id))
    }

    pub async fn insert_track(
        &mut self,
        tracklist: &Tracklist,
        index: usize,
        track: &Track,
    ) -> Result<()> {
        self.ledger(tracklist.id).await?.insert(index, track.id)
    }

    pub async fn remove_track_at(&mut self, tracklist: &Tracklist, index: usize) -> Result<TrackId> {
        self.ledger(tracklist.id).await?.remove(index)
    }

    /// Remove the first occurrence of a track; returns its former position
    pub async fn remove_track(
        &mut self,
        tracklist: &Tracklist,
        track: &Track,
    ) -> Result<Option<usize>> {
        Ok(self.ledger(tracklist.id).await?.remove_track(track.id))
    }

    /// Ordered tracks of a tracklist as seen by this unit (staged included)
    pub async fn tracks_of(&mut self, tracklist: TracklistId) -> Result<Vec<Track>> {
        let ids = self.ledger(tracklist).await?.track_ids().to_vec();
        let mut result = Vec::with_capacity(ids.len());

        for id in ids {
            let track = match self.staged_track(id) {
                Some(track) => track,
                None => tracks::find_track_by_id(&self.pool, id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("Track {}", id)))?,
            };
            result.push(track);
        }

        Ok(result)
    }

    /// Tracklists containing a track as seen by this unit: stored
    /// memberships overridden by any ledger loaded here
    pub async fn tracklists_of(&mut self, track: TrackId) -> Result<Vec<Tracklist>> {
        let mut ids: BTreeSet<TracklistId> = tracklists::tracklists_of(&self.pool, track)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        for (id, ledger) in &self.ledgers {
            if ledger.contains(track) {
                ids.insert(*id);
            } else {
                ids.remove(id);
            }
        }

        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            let tracklist = match self.staged_tracklist(id) {
                Some(tracklist) => tracklist,
                None => tracklists::find_tracklist_by_id(&self.pool, id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("Tracklist {}", id)))?,
            };
            result.push(tracklist);
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result)
    }

    fn staged_track(&self, id: TrackId) -> Option<Track> {
        self.staged.iter().find_map(|s| match s {
            Staged::Track(t) if t.id == id => Some(Track::clone(t)),
            _ => None,
        })
    }

    fn staged_tracklist(&self, id: TracklistId) -> Option<Tracklist> {
        self.staged.iter().find_map(|s| match s {
            Staged::Tracklist(t) if t.id == id => Some(Tracklist::clone(t)),
            _ => None,
        })
    }

    /// Write staged entities and dirty ledgers in one transaction
    ///
    /// Any error (including a constraint violation) rolls the transaction
    /// back; the caller decides whether to retry with a fresh unit.
    pub async fn commit(mut self) -> Result<CommitSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = CommitSummary::default();

        for staged in &self.staged {
            staged.write(&mut tx).await?;
            if staged.entity_id().is_some() {
                summary.entities_inserted += 1;
            }
        }

        for ledger in self.ledgers.values_mut().filter(|l| l.is_dirty()) {
            tracklists::replace_memberships(&mut tx, ledger.tracklist_id(), &ledger.records())
                .await?;
            ledger.mark_clean();
            summary.ledgers_written += 1;
        }

        tx.commit().await?;

        debug!(
            entities = summary.entities_inserted,
            ledgers = summary.ledgers_written,
            "Unit of work committed"
        );

        Ok(summary)
    }

    /// Discard everything staged in this unit
    pub fn rollback(self) {
        info!(
            staged = self.staged.len(),
            ledgers = self.ledgers.len(),
            "Unit of work rolled back"
        );
    }
}
