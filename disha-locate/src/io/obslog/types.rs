//! Core data types for the observation log format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Magic bytes at the start of an observation log.
pub const OBSLOG_MAGIC: [u8; 4] = *b"DOBS";

/// Current log format version.
pub const OBSLOG_VERSION: u16 = 1;

/// Size of the log header in bytes.
pub const HEADER_SIZE: usize = 64;

/// Observation log header (fixed 64-byte region at the file start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObslogHeader {
    /// Magic bytes: "DOBS"
    pub magic: [u8; 4],
    /// File format version
    pub version: u16,
    /// Feature flags (reserved)
    pub flags: u16,
    /// Timestamp of the first record, milliseconds
    pub start_time_ms: u64,
    /// Timestamp of the last record, milliseconds
    pub end_time_ms: u64,
    /// Total number of records in the file
    pub record_count: u64,
    /// Reserved for future use
    pub reserved: [u8; 24],
}

impl ObslogHeader {
    /// Create a header with default values.
    pub fn new() -> Self {
        Self {
            magic: OBSLOG_MAGIC,
            version: OBSLOG_VERSION,
            flags: 0,
            start_time_ms: 0,
            end_time_ms: 0,
            record_count: 0,
            reserved: [0; 24],
        }
    }

    /// Check the magic bytes.
    pub fn is_valid(&self) -> bool {
        self.magic == OBSLOG_MAGIC
    }

    /// Recording span in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Recording span in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

impl Default for ObslogHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary returned when a recording is finalized.
#[derive(Debug, Clone)]
pub struct ObslogInfo {
    /// Path of the written file
    pub path: PathBuf,
    /// Recording span in milliseconds
    pub duration_ms: u64,
    /// Number of records written
    pub record_count: u64,
    /// Final file size in bytes
    pub file_size_bytes: u64,
}
