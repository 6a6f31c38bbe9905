//! Audio tag reading
//!
//! The pipeline only needs artist, album, title, genre and length, so a
//! reader hands back a flat [`TrackInfo`]. Production code uses lofty; tests
//! substitute their own [`MetadataReader`].

use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use thiserror::Error;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File could not be probed or parsed
    #[error("Failed to read file: {0}")]
    ReadError(String),

    /// A required tag is absent or empty
    #[error("Missing tag: {0}")]
    MissingTag(&'static str),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Flat view of one audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub artist: String,
    pub album: String,
    pub name: String,
    /// Whole seconds, truncated
    pub length: u32,
    pub location: String,
    pub genre: Option<String>,
}

/// Source of track metadata
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<TrackInfo, MetadataError>;
}

/// Tag reader backed by lofty
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyReader;

impl LoftyReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataReader for LoftyReader {
    fn read(&self, path: &Path) -> Result<TrackInfo, MetadataError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::ReadError(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ReadError(e.to_string()))?;

        let length = tagged_file.properties().duration().as_secs();

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or(MetadataError::MissingTag("artist"))?;

        let artist = required(tag.artist().map(|s| s.to_string()), "artist")?;
        let album = required(tag.album().map(|s| s.to_string()), "album")?;
        let name = required(tag.title().map(|s| s.to_string()), "title")?;
        let genre = tag
            .genre()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        tracing::debug!(
            file = %path.display(),
            artist = %artist,
            album = %album,
            title = %name,
            length_s = length,
            "Extracted metadata"
        );

        Ok(TrackInfo {
            artist,
            album,
            name,
            length: u32::try_from(length).unwrap_or(u32::MAX),
            location: path.to_string_lossy().to_string(),
            genre,
        })
    }
}

fn required(value: Option<String>, tag: &'static str) -> Result<String, MetadataError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(MetadataError::MissingTag(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_nonexistent_file() {
        let result = LoftyReader::new().read(Path::new("/nonexistent/file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(LoftyReader::new().read(&path).is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(
            required(Some("   ".into()), "title"),
            Err(MetadataError::MissingTag("title"))
        ));
        assert_eq!(required(Some(" Ulver ".into()), "artist").unwrap(), "Ulver");
        assert!(required(None, "album").is_err());
    }
}
