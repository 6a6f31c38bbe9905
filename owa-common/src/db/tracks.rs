//! Track persistence and read queries

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::artists::artist_from_row;
use super::pagination::calculate_pagination;
use super::{get_uuid, Page, PageRequest};
use crate::models::{Artist, ArtistId, Track, TrackId};
use crate::Result;

const TRACK_COLUMNS: &str = "guid, name, slug, artist_id, length_seconds, location, stream";

pub(crate) fn track_from_row(row: &SqliteRow) -> Result<Track> {
    let length: i64 = row.try_get("length_seconds")?;
    Ok(Track {
        id: TrackId(get_uuid(row, "guid")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        artist_id: ArtistId(get_uuid(row, "artist_id")?),
        length: length.max(0) as u32,
        location: row.try_get("location")?,
        stream: get_uuid(row, "stream")?,
    })
}

pub async fn insert_track(conn: &mut SqliteConnection, track: &Track) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tracks (guid, name, slug, artist_id, length_seconds, location, stream)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(track.id.to_string())
    .bind(&track.name)
    .bind(&track.slug)
    .bind(track.artist_id.to_string())
    .bind(track.length as i64)
    .bind(&track.location)
    .bind(track.stream.to_string())
    .execute(conn)
    .await?;

    Ok(())
}

/// Resolver predicate: the (name, artist, location) identity triple
pub async fn find_track_by_identity(
    pool: &SqlitePool,
    name: &str,
    artist_id: ArtistId,
    location: &str,
) -> Result<Option<Track>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM tracks WHERE name = ? AND artist_id = ? AND location = ?",
        TRACK_COLUMNS
    ))
    .bind(name)
    .bind(artist_id.to_string())
    .bind(location)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(track_from_row).transpose()
}

pub async fn find_track_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {} FROM tracks WHERE guid = ?", TRACK_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(track_from_row).transpose()
}

/// Look up the track behind an opaque stream identifier
pub async fn find_track_by_stream(pool: &SqlitePool, stream: Uuid) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {} FROM tracks WHERE stream = ?", TRACK_COLUMNS))
        .bind(stream.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(track_from_row).transpose()
}

/// Tracks with their artist, ordered by track name then artist name
pub async fn list_tracks(pool: &SqlitePool, request: PageRequest) -> Result<Page<(Track, Artist)>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;
    let pagination = calculate_pagination(total, request);

    let rows = sqlx::query(
        r#"
        SELECT t.guid, t.name, t.slug, t.artist_id, t.length_seconds, t.location, t.stream,
               a.guid AS a_guid, a.name AS a_name, a.slug AS a_slug, a.bio AS a_bio
        FROM tracks t
        JOIN artists a ON a.guid = t.artist_id
        ORDER BY t.name, a.name
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(pagination.limit)
    .bind(pagination.offset)
    .fetch_all(pool)
    .await?;

    let items = rows
        .iter()
        .map(|row| {
            let track = track_from_row(row)?;
            let artist = Artist {
                id: ArtistId(get_uuid(row, "a_guid")?),
                name: row.try_get("a_name")?,
                slug: row.try_get("a_slug")?,
                bio: row.try_get("a_bio")?,
            };
            Ok((track, artist))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total, pagination))
}

/// Load a track together with its artist
pub async fn find_track_with_artist(pool: &SqlitePool, id: TrackId) -> Result<Option<(Track, Artist)>> {
    let Some(track) = find_track_by_id(pool, id).await? else {
        return Ok(None);
    };

    let row = sqlx::query("SELECT guid, name, slug, bio FROM artists WHERE guid = ?")
        .bind(track.artist_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(Some((track, artist_from_row(&row)?)))
}
