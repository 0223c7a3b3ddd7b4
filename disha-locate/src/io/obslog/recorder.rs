//! Observation log recorder.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{HEADER_SIZE, ObslogHeader, ObslogInfo};
use crate::core::types::Observation;

/// Error type for log recording operations.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl From<postcard::Error> for RecorderError {
    fn from(e: postcard::Error) -> Self {
        RecorderError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;

/// Writes observations to a binary log file.
///
/// Records are Postcard-serialized with a 4-byte length prefix so the
/// player can stream them back without an index. The header region is
/// reserved at creation and rewritten with final statistics by
/// [`ObslogRecorder::finish`].
///
/// # Example
///
/// ```no_run
/// use disha_locate::core::types::Observation;
/// use disha_locate::io::obslog::ObslogRecorder;
///
/// let mut recorder = ObslogRecorder::create("drive.obslog")?;
/// recorder.record(&Observation::new(0, 35.68, 139.77, -85, "cell-a", "LTE"))?;
/// let info = recorder.finish()?;
/// println!("wrote {} records", info.record_count);
/// # Ok::<(), disha_locate::io::obslog::RecorderError>(())
/// ```
pub struct ObslogRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
    record_count: u64,
    start_time_ms: Option<u64>,
    end_time_ms: u64,
}

impl ObslogRecorder {
    /// Create a new log at the given path, reserving the header region.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&[0u8; HEADER_SIZE])?;

        Ok(Self {
            writer,
            path,
            record_count: 0,
            start_time_ms: None,
            end_time_ms: 0,
        })
    }

    /// Append one observation.
    pub fn record(&mut self, observation: &Observation) -> Result<()> {
        if self.start_time_ms.is_none() {
            self.start_time_ms = Some(observation.timestamp_ms);
        }
        self.end_time_ms = observation.timestamp_ms;

        let bytes = postcard::to_allocvec(observation)?;
        let len = bytes.len() as u32;
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;

        self.record_count += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Finalize the log: write the real header and close the file.
    pub fn finish(mut self) -> Result<ObslogInfo> {
        self.writer.flush()?;
        let file_size = self.writer.stream_position()?;
        self.writer.seek(SeekFrom::Start(0))?;

        let header = ObslogHeader {
            start_time_ms: self.start_time_ms.unwrap_or(0),
            end_time_ms: self.end_time_ms,
            record_count: self.record_count,
            ..ObslogHeader::new()
        };

        // Serialize into the fixed-size header region, zero-padded.
        let header_bytes = postcard::to_allocvec(&header)?;
        let mut buffer = [0u8; HEADER_SIZE];
        let len = header_bytes.len().min(HEADER_SIZE);
        buffer[..len].copy_from_slice(&header_bytes[..len]);
        self.writer.write_all(&buffer)?;
        self.writer.flush()?;

        Ok(ObslogInfo {
            path: self.path,
            duration_ms: self.end_time_ms.saturating_sub(self.start_time_ms.unwrap_or(0)),
            record_count: self.record_count,
            file_size_bytes: file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn obs(t: u64) -> Observation {
        Observation::new(t, 35.68, 139.77, -85, "cell-a", "LTE")
    }

    #[test]
    fn test_create_and_finish_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.obslog");

        let recorder = ObslogRecorder::create(&path).unwrap();
        let info = recorder.finish().unwrap();

        assert_eq!(info.record_count, 0);
        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() >= HEADER_SIZE as u64);
    }

    #[test]
    fn test_record_counts_and_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drive.obslog");

        let mut recorder = ObslogRecorder::create(&path).unwrap();
        for i in 0..100 {
            recorder.record(&obs(i * 2000)).unwrap(); // 0.5 Hz polling
        }
        assert_eq!(recorder.record_count(), 100);

        let info = recorder.finish().unwrap();
        assert_eq!(info.record_count, 100);
        assert_eq!(info.duration_ms, 99 * 2000);
    }
}
