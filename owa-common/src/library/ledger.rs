//! Ordered membership ledger for one tracklist
//!
//! Positions are never stored in the ledger itself: a track's position is
//! its index, so the sequence is always contiguous and 0-based. Every
//! mutation goes through a method here and marks the ledger dirty; the unit
//! of work rewrites the membership rows of dirty ledgers on commit.

use crate::models::{Membership, TrackId, TracklistId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    tracklist_id: TracklistId,
    entries: Vec<TrackId>,
    dirty: bool,
}

impl Ledger {
    /// Empty ledger for a tracklist with no membership records
    pub fn new(tracklist_id: TracklistId) -> Self {
        Self {
            tracklist_id,
            entries: Vec::new(),
            dirty: false,
        }
    }

    /// Ledger loaded from stored records, already in position order
    pub fn from_ordered(tracklist_id: TracklistId, entries: Vec<TrackId>) -> Self {
        Self {
            tracklist_id,
            entries,
            dirty: false,
        }
    }

    pub fn tracklist_id(&self) -> TracklistId {
        self.tracklist_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Track ids in position order
    pub fn track_ids(&self) -> &[TrackId] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<TrackId> {
        self.entries.get(position).copied()
    }

    pub fn contains(&self, track: TrackId) -> bool {
        self.entries.contains(&track)
    }

    /// Position of the first occurrence of `track`
    pub fn position_of(&self, track: TrackId) -> Option<usize> {
        self.entries.iter().position(|t| *t == track)
    }

    /// Append at `position = len`; returns the new position
    pub fn append(&mut self, track: TrackId) -> usize {
        self.entries.push(track);
        self.dirty = true;
        self.entries.len() - 1
    }

    /// Insert at `index`, shifting every record at `>= index` up by one
    pub fn insert(&mut self, index: usize, track: TrackId) -> Result<()> {
        if index > self.entries.len() {
            return Err(Error::InvalidInput(format!(
                "Insert position {} beyond tracklist length {}",
                index,
                self.entries.len()
            )));
        }
        self.entries.insert(index, track);
        self.dirty = true;
        Ok(())
    }

    /// Remove the record at `index`, closing the gap
    pub fn remove(&mut self, index: usize) -> Result<TrackId> {
        if index >= self.entries.len() {
            return Err(Error::InvalidInput(format!(
                "No track at position {} (tracklist length {})",
                index,
                self.entries.len()
            )));
        }
        self.dirty = true;
        Ok(self.entries.remove(index))
    }

    /// Remove the first occurrence of `track`; returns its former position
    pub fn remove_track(&mut self, track: TrackId) -> Option<usize> {
        let position = self.position_of(track)?;
        self.entries.remove(position);
        self.dirty = true;
        Some(position)
    }

    /// Move the record at `from` so that it ends up at `to`
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(Error::InvalidInput(format!(
                "Move {} -> {} out of range for tracklist length {}",
                from, to, len
            )));
        }
        if from != to {
            let track = self.entries.remove(from);
            self.entries.insert(to, track);
            self.dirty = true;
        }
        Ok(())
    }

    /// Membership records with contiguous 0-based positions
    pub fn records(&self) -> Vec<Membership> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, track_id)| Membership {
                tracklist_id: self.tracklist_id,
                track_id: *track_id,
                position: position as i64,
            })
            .collect()
    }
}
