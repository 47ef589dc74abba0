//! CSV importers for the catalog and the student transcript

pub mod catalog;
pub mod csv;
pub mod transcript;

pub use catalog::{load_catalog, parse_catalog_csv};
pub use transcript::{parse_transcript_csv, TranscriptError};
