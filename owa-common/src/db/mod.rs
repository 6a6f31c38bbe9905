//! Database schema, row mapping and queries

pub mod artists;
pub mod init;
pub mod members;
pub mod pagination;
pub mod tags;
pub mod tracklists;
pub mod tracks;

pub use init::*;
pub use pagination::{Page, PageRequest};

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::Result;

/// Read a TEXT guid column as a UUID
pub(crate) fn get_uuid(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Ok(Uuid::parse_str(&raw)?)
}

/// Read a nullable TEXT guid column
pub(crate) fn get_optional_uuid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>> {
    let raw: Option<String> = row.try_get(column)?;
    match raw {
        Some(raw) => Ok(Some(Uuid::parse_str(&raw)?)),
        None => Ok(None),
    }
}

/// Public lookup key: either a guid or a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(Uuid),
    Slug(String),
}

impl LookupKey {
    /// Anything that parses as a UUID is an id, everything else a slug
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => LookupKey::Id(id),
            Err(_) => LookupKey::Slug(raw.to_lowercase()),
        }
    }
}
