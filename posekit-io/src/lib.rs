//! I/O operations for motion sequences
//!
//! This crate reads and writes [`PoseSequence`]s in CSV and JSON form and
//! provides the configurable import pipeline used by loaders
//! ([`LoadOptions`]).

pub mod csv;
pub mod json;
pub mod options;

pub use csv::{CsvReader, CsvWriter};
pub use json::{JsonReader, JsonWriter, SequenceDocument};
pub use options::LoadOptions;

use posekit_core::{Error, PoseSequence, Result};
use std::path::Path;

/// Trait for reading sequences from files
pub trait SequenceReader {
    fn read_sequence<P: AsRef<Path>>(path: P) -> Result<PoseSequence>;
}

/// Trait for writing sequences to files
pub trait SequenceWriter {
    fn write_sequence<P: AsRef<Path>>(sequence: &PoseSequence, path: P) -> Result<()>;
}

/// Auto-detect format and read a sequence
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<PoseSequence> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => CsvReader::read_sequence(path),
        Some("json") => JsonReader::read_sequence(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported sequence format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a sequence
pub fn write_sequence<P: AsRef<Path>>(sequence: &PoseSequence, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => CsvWriter::write_sequence(sequence, path),
        Some("json") => JsonWriter::write_sequence(sequence, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported sequence format: {:?}",
            path.extension()
        ))),
    }
}

/// Read a sequence and run it through the import pipeline
pub fn load_sequence<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<PoseSequence> {
    options.apply(read_sequence(path)?)
}
