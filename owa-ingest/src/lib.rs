//! owa-ingest library interface
//!
//! Directory scanning, tag reading and the ingestion pipeline used by the
//! `owa-ingest` binary. Exposed as a library for integration testing.

pub mod metadata;
pub mod pipeline;
pub mod scanner;

pub use metadata::{LoftyReader, MetadataError, MetadataReader, TrackInfo};
pub use pipeline::{IngestError, IngestReport, Ingestor};
pub use scanner::{FileGroup, ScanError, Scanner};
