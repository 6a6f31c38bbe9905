//! Artist persistence and read queries

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::pagination::calculate_pagination;
use super::{get_uuid, LookupKey, Page, PageRequest};
use crate::models::{Artist, ArtistId, Tag};
use crate::Result;

const ARTIST_COLUMNS: &str = "guid, name, slug, bio";

pub(crate) fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    Ok(Artist {
        id: ArtistId(get_uuid(row, "guid")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        bio: row.try_get("bio")?,
    })
}

/// Insert a new artist row
pub async fn insert_artist(conn: &mut SqliteConnection, artist: &Artist) -> Result<()> {
    sqlx::query("INSERT INTO artists (guid, name, slug, bio) VALUES (?, ?, ?, ?)")
        .bind(artist.id.to_string())
        .bind(&artist.name)
        .bind(&artist.slug)
        .bind(&artist.bio)
        .execute(conn)
        .await?;

    Ok(())
}

/// Load artist by exact name (resolver predicate)
pub async fn find_artist_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("SELECT {} FROM artists WHERE name = ?", ARTIST_COLUMNS))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(artist_from_row).transpose()
}

pub async fn find_artist_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("SELECT {} FROM artists WHERE guid = ?", ARTIST_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(artist_from_row).transpose()
}

/// Load artist by guid or slug
///
/// Slugs are not unique; the first match by name wins.
pub async fn find_artist(pool: &SqlitePool, key: &LookupKey) -> Result<Option<Artist>> {
    match key {
        LookupKey::Id(id) => find_artist_by_id(pool, ArtistId(*id)).await,
        LookupKey::Slug(slug) => {
            let row = sqlx::query(&format!(
                "SELECT {} FROM artists WHERE slug = ? ORDER BY name LIMIT 1",
                ARTIST_COLUMNS
            ))
            .bind(slug)
            .fetch_optional(pool)
            .await?;

            row.as_ref().map(artist_from_row).transpose()
        }
    }
}

/// Artists ordered by name
pub async fn list_artists(pool: &SqlitePool, request: PageRequest) -> Result<Page<Artist>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
        .fetch_one(pool)
        .await?;
    let pagination = calculate_pagination(total, request);

    let rows = sqlx::query(&format!(
        "SELECT {} FROM artists ORDER BY name LIMIT ? OFFSET ?",
        ARTIST_COLUMNS
    ))
    .bind(pagination.limit)
    .bind(pagination.offset)
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(artist_from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, pagination))
}

/// Tags applied to an artist by all members, most used first
pub async fn top_tags_for_artist(pool: &SqlitePool, id: ArtistId) -> Result<Vec<(Tag, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT tags.guid, tags.name, COUNT(*) AS uses
        FROM taggings
        JOIN tags ON tags.guid = taggings.tag_id
        WHERE taggings.artist_id = ?
        GROUP BY tags.guid, tags.name
        ORDER BY uses DESC, tags.name
        "#,
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok((super::tags::tag_from_row(row)?, row.try_get("uses")?)))
        .collect()
}
