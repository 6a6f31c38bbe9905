//! # OWA Common Library
//!
//! Shared code for the OWA music library services:
//! - Domain model (artists, members, tracks, albums/playlists, tags)
//! - Unique-entity resolver and unit of work
//! - Ordered membership ledger for tracklists
//! - Database schema and queries
//! - Configuration loading

pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod library;
pub mod models;

pub use error::{ConstraintKind, Error, Result};
pub use library::{Ledger, UnitOfWork};
