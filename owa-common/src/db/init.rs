//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the library schema.
//! Ordering and uniqueness invariants are enforced here as table
//! constraints so that a bypassed in-memory ledger cannot corrupt a
//! tracklist.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Every connection to `sqlite::memory:` is a separate database, so the
/// pool is capped at one connection.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all library tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_members_table(pool).await?;
    create_tracks_table(pool).await?;
    create_tracklists_table(pool).await?;
    create_tracklist_tracks_table(pool).await?;
    create_tags_table(pool).await?;
    create_taggings_table(pool).await?;
    Ok(())
}

pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL,
            bio TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Names are the identity; distinct names may share a slug
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artists_slug ON artists(slug)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            bio TEXT,
            permissions INTEGER NOT NULL DEFAULT 3,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_slug ON members(slug)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            artist_id TEXT NOT NULL REFERENCES artists(guid),
            length_seconds INTEGER NOT NULL CHECK (length_seconds >= 0),
            location TEXT NOT NULL UNIQUE,
            stream TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (name, artist_id, location)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_artist ON tracks(artist_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Albums and playlists share one table; `kind` is the discriminator and
/// exactly one owner column matching it must be set.
pub async fn create_tracklists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracklists (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('album', 'playlist')),
            artist_id TEXT REFERENCES artists(guid),
            member_id TEXT REFERENCES members(guid),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (
                (kind = 'album' AND artist_id IS NOT NULL AND member_id IS NULL)
                OR (kind = 'playlist' AND member_id IS NOT NULL AND artist_id IS NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_unique
        ON tracklists(name, artist_id) WHERE kind = 'album'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_playlists_unique
        ON tracklists(name, member_id) WHERE kind = 'playlist'
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Membership records. `(tracklist_id, position)` is the primary key, which
/// also makes `(tracklist_id, track_id, position)` unique.
pub async fn create_tracklist_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracklist_tracks (
            tracklist_id TEXT NOT NULL REFERENCES tracklists(guid) ON DELETE CASCADE,
            track_id TEXT NOT NULL REFERENCES tracks(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL CHECK (position >= 0),
            PRIMARY KEY (tracklist_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tracklist_tracks_track ON tracklist_tracks(track_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_taggings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taggings (
            member_id TEXT NOT NULL REFERENCES members(guid) ON DELETE CASCADE,
            artist_id TEXT NOT NULL REFERENCES artists(guid) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES tags(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT taggings_unique UNIQUE (member_id, artist_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
