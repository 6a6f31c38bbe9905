//! Member persistence and read queries

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::pagination::calculate_pagination;
use super::{get_uuid, LookupKey, Page, PageRequest};
use crate::credentials::PasswordHash;
use crate::models::{Member, MemberId, Permissions, Tag};
use crate::Result;

const MEMBER_COLUMNS: &str = "guid, name, slug, email, password_hash, password_salt, bio, permissions";

fn member_from_row(row: &SqliteRow) -> Result<Member> {
    let permissions: i64 = row.try_get("permissions")?;
    Ok(Member {
        id: MemberId(get_uuid(row, "guid")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        email: row.try_get("email")?,
        password: PasswordHash::from_parts(
            row.try_get("password_hash")?,
            row.try_get("password_salt")?,
        ),
        bio: row.try_get("bio")?,
        permissions: Permissions(permissions as u32),
    })
}

pub async fn insert_member(conn: &mut SqliteConnection, member: &Member) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO members (guid, name, slug, email, password_hash, password_salt, bio, permissions)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(member.id.to_string())
    .bind(&member.name)
    .bind(&member.slug)
    .bind(&member.email)
    .bind(&member.password.hash)
    .bind(&member.password.salt)
    .bind(&member.bio)
    .bind(member.permissions.0 as i64)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn find_member_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Member>> {
    let row = sqlx::query(&format!("SELECT {} FROM members WHERE name = ?", MEMBER_COLUMNS))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(member_from_row).transpose()
}

pub async fn find_member_by_id(pool: &SqlitePool, id: MemberId) -> Result<Option<Member>> {
    let row = sqlx::query(&format!("SELECT {} FROM members WHERE guid = ?", MEMBER_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(member_from_row).transpose()
}

/// Load member by guid or slug
///
/// Slugs are not unique; the first match by name wins.
pub async fn find_member(pool: &SqlitePool, key: &LookupKey) -> Result<Option<Member>> {
    match key {
        LookupKey::Id(id) => find_member_by_id(pool, MemberId(*id)).await,
        LookupKey::Slug(slug) => {
            let row = sqlx::query(&format!(
                "SELECT {} FROM members WHERE slug = ? ORDER BY name LIMIT 1",
                MEMBER_COLUMNS
            ))
            .bind(slug)
            .fetch_optional(pool)
            .await?;

            row.as_ref().map(member_from_row).transpose()
        }
    }
}

/// Members ordered by name
pub async fn list_members(pool: &SqlitePool, request: PageRequest) -> Result<Page<Member>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;
    let pagination = calculate_pagination(total, request);

    let rows = sqlx::query(&format!(
        "SELECT {} FROM members ORDER BY name LIMIT ? OFFSET ?",
        MEMBER_COLUMNS
    ))
    .bind(pagination.limit)
    .bind(pagination.offset)
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(member_from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, pagination))
}

/// Tags a member has applied across all artists, most used first
pub async fn top_tags_for_member(pool: &SqlitePool, id: MemberId) -> Result<Vec<(Tag, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT tags.guid, tags.name, COUNT(*) AS uses
        FROM taggings
        JOIN tags ON tags.guid = taggings.tag_id
        WHERE taggings.member_id = ?
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
