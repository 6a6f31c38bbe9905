//! Tag and tagging persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::artists::artist_from_row;
use super::pagination::calculate_pagination;
use super::{get_uuid, LookupKey, Page, PageRequest};
use crate::models::{normalize_tag, slugify, Artist, Tag, TagId, Tagging};
use crate::Result;

pub(crate) fn tag_from_row(row: &SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: TagId(get_uuid(row, "guid")?),
        name: row.try_get("name")?,
    })
}

pub async fn insert_tag(conn: &mut SqliteConnection, tag: &Tag) -> Result<()> {
    sqlx::query("INSERT INTO tags (guid, name) VALUES (?, ?)")
        .bind(tag.id.to_string())
        .bind(&tag.name)
        .execute(conn)
        .await?;

    Ok(())
}

/// Resolver predicate: compares normalized names
pub async fn find_tag_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT guid, name FROM tags WHERE name = ?")
        .bind(normalize_tag(name))
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(tag_from_row).transpose()
}

/// Load tag by guid or slug
pub async fn find_tag(pool: &SqlitePool, key: &LookupKey) -> Result<Option<Tag>> {
    match key {
        LookupKey::Id(id) => {
            let row = sqlx::query("SELECT guid, name FROM tags WHERE guid = ?")
                .bind(id.to_string())
                .fetch_optional(pool)
                .await?;

            row.as_ref().map(tag_from_row).transpose()
        }
        LookupKey::Slug(slug) => {
            // Tag names are short and few; slugs are derived rather than stored
            let rows = sqlx::query("SELECT guid, name FROM tags ORDER BY name")
                .fetch_all(pool)
                .await?;

            for row in &rows {
                let tag = tag_from_row(row)?;
                if slugify(&tag.name) == *slug {
                    return Ok(Some(tag));
                }
            }
            Ok(None)
        }
    }
}

/// Tags ordered by name
pub async fn list_tags(pool: &SqlitePool, request: PageRequest) -> Result<Page<Tag>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;
    let pagination = calculate_pagination(total, request);

    let rows = sqlx::query("SELECT guid, name FROM tags ORDER BY name LIMIT ? OFFSET ?")
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(pool)
        .await?;

    let items = rows.iter().map(tag_from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, pagination))
}

/// Insert a tagging record; a repeated (member, artist, tag) triple is a
/// unique violation
pub async fn insert_tagging(conn: &mut SqliteConnection, tagging: &Tagging) -> Result<()> {
    sqlx::query("INSERT INTO taggings (member_id, artist_id, tag_id) VALUES (?, ?, ?)")
        .bind(tagging.member_id.to_string())
        .bind(tagging.artist_id.to_string())
        .bind(tagging.tag_id.to_string())
        .execute(conn)
        .await?;

    Ok(())
}

/// Artists carrying a tag, most tagged first
pub async fn top_artists_for_tag(pool: &SqlitePool, id: TagId) -> Result<Vec<(Artist, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT artists.guid, artists.name, artists.slug, artists.bio, COUNT(*) AS uses
        FROM taggings
        JOIN artists ON artists.guid = taggings.artist_id
        WHERE taggings.tag_id = ?
        GROUP BY artists.guid
        ORDER BY uses DESC, artists.name
        "#,
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok((artist_from_row(row)?, row.try_get("uses")?)))
        .collect()
}
