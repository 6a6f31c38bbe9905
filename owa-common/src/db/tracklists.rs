//! Tracklist (album/playlist) persistence and membership records

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::pagination::calculate_pagination;
use super::tracks::track_from_row;
use super::{get_optional_uuid, get_uuid, Page, PageRequest};
use crate::models::{
    ArtistId, MemberId, Membership, Owner, Track, TrackId, Tracklist, TracklistId, TracklistKind,
};
use crate::{Error, Result};

const TRACKLIST_COLUMNS: &str = "guid, name, slug, kind, artist_id, member_id";

fn tracklist_from_row(row: &SqliteRow) -> Result<Tracklist> {
    let kind: String = row.try_get("kind")?;
    let owner = match TracklistKind::parse(&kind) {
        Some(TracklistKind::Album) => get_optional_uuid(row, "artist_id")?
            .map(|id| Owner::Artist(ArtistId(id))),
        Some(TracklistKind::Playlist) => get_optional_uuid(row, "member_id")?
            .map(|id| Owner::Member(MemberId(id))),
        None => None,
    }
    .ok_or_else(|| Error::Internal(format!("Tracklist row with invalid owner/kind: {}", kind)))?;

    Ok(Tracklist {
        id: TracklistId(get_uuid(row, "guid")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        owner,
    })
}

pub async fn insert_tracklist(conn: &mut SqliteConnection, tracklist: &Tracklist) -> Result<()> {
    let (artist_id, member_id) = match tracklist.owner {
        Owner::Artist(id) => (Some(id.to_string()), None),
        Owner::Member(id) => (None, Some(id.to_string())),
    };

    sqlx::query(
        r#"
        INSERT INTO tracklists (guid, name, slug, kind, artist_id, member_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tracklist.id.to_string())
    .bind(&tracklist.name)
    .bind(&tracklist.slug)
    .bind(tracklist.kind().as_str())
    .bind(artist_id)
    .bind(member_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Resolver predicate for albums and playlists: name within owner
pub async fn find_tracklist_by_owner(
    pool: &SqlitePool,
    name: &str,
    owner: Owner,
) -> Result<Option<Tracklist>> {
    let (owner_column, owner_id) = match owner {
        Owner::Artist(id) => ("artist_id", id.to_string()),
        Owner::Member(id) => ("member_id", id.to_string()),
    };

    let row = sqlx::query(&format!(
        "SELECT {} FROM tracklists WHERE kind = ? AND name = ? AND {} = ?",
        TRACKLIST_COLUMNS, owner_column
    ))
    .bind(owner.tracklist_kind().as_str())
    .bind(name)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(tracklist_from_row).transpose()
}

pub async fn find_tracklist_by_id(pool: &SqlitePool, id: TracklistId) -> Result<Option<Tracklist>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM tracklists WHERE guid = ?",
        TRACKLIST_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(tracklist_from_row).transpose()
}

/// Tracklists ordered by name, optionally restricted to one kind
pub async fn list_tracklists(
    pool: &SqlitePool,
    kind: Option<TracklistKind>,
    request: PageRequest,
) -> Result<Page<Tracklist>> {
    let kind = kind.map(TracklistKind::as_str);

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tracklists WHERE (? IS NULL OR kind = ?)")
            .bind(kind)
            .bind(kind)
            .fetch_one(pool)
            .await?;
    let pagination = calculate_pagination(total, request);

    let rows = sqlx::query(&format!(
        "SELECT {} FROM tracklists WHERE (? IS NULL OR kind = ?) ORDER BY name LIMIT ? OFFSET ?",
        TRACKLIST_COLUMNS
    ))
    .bind(kind)
    .bind(kind)
    .bind(pagination.limit)
    .bind(pagination.offset)
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(tracklist_from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, pagination))
}

/// Albums of an artist or playlists of a member, ordered by name
pub async fn tracklists_for_owner(pool: &SqlitePool, owner: Owner) -> Result<Vec<Tracklist>> {
    let (owner_column, owner_id) = match owner {
        Owner::Artist(id) => ("artist_id", id.to_string()),
        Owner::Member(id) => ("member_id", id.to_string()),
    };

    let rows = sqlx::query(&format!(
        "SELECT {} FROM tracklists WHERE {} = ? ORDER BY name",
        TRACKLIST_COLUMNS, owner_column
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(tracklist_from_row).collect()
}

/// Track ids of a tracklist in position order
pub async fn load_track_order(pool: &SqlitePool, id: TracklistId) -> Result<Vec<TrackId>> {
    let rows = sqlx::query(
        "SELECT track_id FROM tracklist_tracks WHERE tracklist_id = ? ORDER BY position",
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok(TrackId(get_uuid(row, "track_id")?)))
        .collect()
}

/// Ordered tracks of a tracklist with their positions
pub async fn tracks_of(pool: &SqlitePool, id: TracklistId) -> Result<Vec<(i64, Track)>> {
    let rows = sqlx::query(
        r#"
        SELECT tt.position, t.guid, t.name, t.slug, t.artist_id, t.length_seconds, t.location, t.stream
        FROM tracklist_tracks tt
        JOIN tracks t ON t.guid = tt.track_id
        WHERE tt.tracklist_id = ?
        ORDER BY tt.position
        "#,
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok((row.try_get("position")?, track_from_row(row)?)))
        .collect()
}

/// Tracklists that contain a track (each listed once), ordered by name
pub async fn tracklists_of(pool: &SqlitePool, track: TrackId) -> Result<Vec<Tracklist>> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT tl.guid, tl.name, tl.slug, tl.kind, tl.artist_id, tl.member_id
        FROM tracklist_tracks tt
        JOIN tracklists tl ON tl.guid = tt.tracklist_id
        WHERE tt.track_id = ?
        ORDER BY tl.name
        "#,
    )
    .bind(track.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(tracklist_from_row).collect()
}

/// Insert a single membership record as given, without renumbering
///
/// Storage constraints reject negative and duplicate positions.
pub async fn insert_membership(conn: &mut SqliteConnection, record: &Membership) -> Result<()> {
    sqlx::query("INSERT INTO tracklist_tracks (tracklist_id, track_id, position) VALUES (?, ?, ?)")
        .bind(record.tracklist_id.to_string())
        .bind(record.track_id.to_string())
        .bind(record.position)
        .execute(conn)
        .await?;

    Ok(())
}

/// Replace every membership record of a tracklist
pub async fn replace_memberships(
    conn: &mut SqliteConnection,
    id: TracklistId,
    records: &[Membership],
) -> Result<()> {
    sqlx::query("DELETE FROM tracklist_tracks WHERE tracklist_id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    for record in records {
        insert_membership(&mut *conn, record).await?;
    }

    Ok(())
}
