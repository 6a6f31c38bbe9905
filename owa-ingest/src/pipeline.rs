//! Ingestion pipeline
//!
//! Each directory group is processed inside its own [`UnitOfWork`]: every
//! readable file resolves its artist, album and track and is appended to the
//! album when not already on it. The group is committed once at the end.
//! A constraint violation rolls that group back and processing moves on to
//! the next one; any other storage error aborts the run.

use owa_common::library::UnitOfWork;
use owa_common::models::{normalize_tag, Artist, ArtistId, Member, TagId, Track, Tracklist};
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::metadata::{LoftyReader, MetadataError, MetadataReader, TrackInfo};
use crate::scanner::{ScanError, Scanner};

/// Fatal ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Storage error: {0}")]
    Storage(#[from] owa_common::Error),
}

/// Outcome of one `store_directory` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub groups_committed: usize,
    pub groups_failed: usize,
    pub files_stored: usize,
    pub files_skipped: usize,
    pub elapsed: Duration,
}

/// Characters a composite genre is broken on
const TAG_BREAKERS: &[char] = &['\\', '/', '&', ','];

/// Drop featured artists: `"A feat. B"` becomes `"A"`
pub fn normalize_artist(name: &str) -> String {
    match name.split_once("feat.") {
        Some((main, _)) => main.trim().to_string(),
        None => name.trim().to_string(),
    }
}

/// Fold featured artists into the main artist
///
/// A name made only of featured artists counts as a missing artist tag.
pub fn fold_featured(mut info: TrackInfo) -> Result<TrackInfo, MetadataError> {
    info.artist = normalize_artist(&info.artist);
    if info.artist.is_empty() {
        return Err(MetadataError::MissingTag("artist"));
    }
    Ok(info)
}

/// Break a composite genre into normalized tag names
///
/// ```
/// use owa_ingest::pipeline::break_tag;
///
/// let tags = break_tag("Viking / folk");
/// assert!(tags.contains("viking") && tags.contains("folk"));
/// assert_eq!(break_tag("progressive metal / black metal").len(), 3);
/// assert_eq!(break_tag("Black Metal / metal").len(), 2);
/// ```
pub fn break_tag(genre: &str) -> BTreeSet<String> {
    genre
        .split(|c: char| TAG_BREAKERS.contains(&c) || c.is_whitespace())
        .map(normalize_tag)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Resolve the artist, album and track for one file and place the track on
/// the album if it is not already there
pub async fn adapt_track(
    uow: &mut UnitOfWork,
    info: &TrackInfo,
) -> owa_common::Result<(Arc<Artist>, Arc<Tracklist>, Arc<Track>)> {
    let artist = uow.artist(&normalize_artist(&info.artist)).await?;
    let album = uow.album(&info.album, &artist).await?;
    let track = uow
        .track(&info.name, &artist, info.length, &info.location)
        .await?;

    let ledger = uow.ledger(album.id).await?;
    if !ledger.contains(track.id) {
        ledger.append(track.id);
    }

    Ok((artist, album, track))
}

/// Stage one tagging per distinct tag in `genres`; returns how many were
/// staged
pub async fn tag_artist(
    uow: &mut UnitOfWork,
    genres: &str,
    member: &Member,
    artist: &Artist,
) -> owa_common::Result<usize> {
    let mut seen: HashSet<TagId> = HashSet::new();
    for piece in break_tag(genres) {
        let tag = uow.tag(&piece).await?;
        if seen.insert(tag.id) {
            uow.tag_artist(member, artist, &tag);
        }
    }
    Ok(seen.len())
}

/// Names of the last file handled in a group, for error reports
#[derive(Debug, Default)]
struct LastProcessed {
    artist: String,
    album: String,
    track: String,
}

/// Directory ingestor
pub struct Ingestor<R: MetadataReader = LoftyReader> {
    pool: SqlitePool,
    scanner: Scanner,
    reader: R,
}

impl Ingestor<LoftyReader> {
    pub fn new<S: AsRef<str>>(pool: SqlitePool, extensions: &[S]) -> Self {
        Self::with_reader(pool, extensions, LoftyReader::new())
    }
}

impl<R: MetadataReader> Ingestor<R> {
    pub fn with_reader<S: AsRef<str>>(pool: SqlitePool, extensions: &[S], reader: R) -> Self {
        Self {
            pool,
            scanner: Scanner::new(extensions),
            reader,
        }
    }

    /// Walk `root` and store every readable track, one commit per directory
    ///
    /// When `member` is given, each artist created during this run is tagged
    /// by that member once, from the genre of the first of its tracks that
    /// has one.
    pub async fn store_directory(
        &self,
        root: &Path,
        member: Option<&Member>,
    ) -> Result<IngestReport, IngestError> {
        let start = Instant::now();
        let groups = self.scanner.find_groups(root)?;
        let mut report = IngestReport::default();
        let mut genre_checked: HashSet<ArtistId> = HashSet::new();

        info!(root = %root.display(), groups = groups.len(), "Starting ingestion");

        for group in groups {
            let mut uow = UnitOfWork::new(self.pool.clone());
            let mut last = LastProcessed::default();
            let mut stored = 0;

            for file in &group.files {
                let info = match self.reader.read(file).and_then(fold_featured) {
                    Ok(info) => info,
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "Skipping file");
                        report.files_skipped += 1;
                        continue;
                    }
                };

                let (artist, album, track) = adapt_track(&mut uow, &info).await?;

                if let (Some(member), Some(genre)) = (member, info.genre.as_deref()) {
                    if uow.is_new(artist.id.0) && genre_checked.insert(artist.id) {
                        let count = tag_artist(&mut uow, genre, member, &artist).await?;
                        debug!(artist = %artist.name, tags = count, "Tagged artist");
                    }
                }

                info!(
                    artist = %artist.name,
                    album = %album.name,
                    track = %track.name,
                    "Processed"
                );

                last = LastProcessed {
                    artist: artist.name.clone(),
                    album: album.name.clone(),
                    track: track.name.clone(),
                };
                stored += 1;
            }

            if stored == 0 {
                continue;
            }

            match uow.commit().await {
                Ok(summary) => {
                    report.groups_committed += 1;
                    report.files_stored += stored;
                    info!(
                        dir = %group.dir.display(),
                        artist = %last.artist,
                        album = %last.album,
                        files = report.files_stored,
                        inserted = summary.entities_inserted,
                        elapsed_s = start.elapsed().as_secs(),
                        "Stored group"
                    );
                }
                Err(e) if e.is_constraint() => {
                    report.groups_failed += 1;
                    error!(
                        dir = %group.dir.display(),
                        artist = %last.artist,
                        album = %last.album,
                        track = %last.track,
                        error = %e,
                        "Group rolled back"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        report.elapsed = start.elapsed();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_of(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_artist_strips_featuring() {
        assert_eq!(normalize_artist("Ayreon feat. Bruce Dickinson"), "Ayreon");
        assert_eq!(normalize_artist("  Opeth "), "Opeth");
    }

    fn info(artist: &str) -> TrackInfo {
        TrackInfo {
            artist: artist.to_string(),
            album: "Anthems".to_string(),
            name: "Ye Entrancemperium".to_string(),
            length: 300,
            location: "/m/e/01.mp3".to_string(),
            genre: None,
        }
    }

    #[test]
    fn test_fold_featured() {
        let folded = fold_featured(info("Emperor feat. Ihsahn")).unwrap();
        assert_eq!(folded.artist, "Emperor");

        assert!(matches!(
            fold_featured(info("feat. Nobody")),
            Err(MetadataError::MissingTag("artist"))
        ));
        assert!(matches!(
            fold_featured(info("  feat.")),
            Err(MetadataError::MissingTag("artist"))
        ));
    }

    #[test]
    fn test_break_tag() {
        let expected: BTreeSet<String> = ["dance", "pop"].iter().map(|s| s.to_string()).collect();
        assert_eq!(break_tag("dance & pop"), expected);

        let expected: BTreeSet<String> =
            ["thrash", "metal"].iter().map(|s| s.to_string()).collect();
        assert_eq!(break_tag("thrash metal"), expected);

        assert_eq!(break_tag(r"rock\roll,,  / ").len(), 2);
        assert_eq!(break_tag("Black Metal / METAL, black"), expected_of(&["black", "metal"]));
        assert!(break_tag("  ").is_empty());
    }
}
