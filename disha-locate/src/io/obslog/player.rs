//! Observation log player.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use super::types::{HEADER_SIZE, ObslogHeader};
use crate::core::types::Observation;

/// Largest record the player will accept, bytes.
///
/// An observation is a few dozen bytes; anything bigger means a corrupt
/// length prefix.
const MAX_RECORD_BYTES: usize = 64 * 1024;

/// Error type for log playback operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialize(String),
    /// Invalid log file format
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl From<postcard::Error> for PlayerError {
    fn from(e: postcard::Error) -> Self {
        PlayerError::Deserialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;

/// Streams observations back out of a log file.
///
/// # Example
///
/// ```no_run
/// use disha_locate::io::obslog::ObslogPlayer;
///
/// let mut player = ObslogPlayer::open("drive.obslog")?;
/// println!("{} records", player.header().record_count);
/// while let Some(obs) = player.next_record()? {
///     println!("{} {} dBm", obs.cell_id, obs.rssi_dbm);
/// }
/// # Ok::<(), disha_locate::io::obslog::PlayerError>(())
/// ```
pub struct ObslogPlayer {
    reader: BufReader<File>,
    header: ObslogHeader,
    records_read: u64,
}

impl ObslogPlayer {
    /// Open a log file and validate its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header_buffer = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_buffer)?;

        let header: ObslogHeader = postcard::from_bytes(&header_buffer)
            .map_err(|e| PlayerError::InvalidFormat(format!("failed to parse header: {e}")))?;
        if !header.is_valid() {
            return Err(PlayerError::InvalidFormat(
                "invalid observation log magic bytes".to_string(),
            ));
        }

        Ok(Self {
            reader,
            header,
            records_read: 0,
        })
    }

    /// The log header.
    pub fn header(&self) -> &ObslogHeader {
        &self.header
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read the next observation, or `None` at end of file.
    pub fn next_record(&mut self) -> Result<Option<Observation>> {
        let mut len_bytes = [0u8; 4];
        match self.reader.read_exact(&mut len_bytes) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_bytes) as usize;
        if len > MAX_RECORD_BYTES {
            return Err(PlayerError::InvalidFormat(format!(
                "record too large: {len} bytes"
            )));
        }

        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;

        let observation: Observation = postcard::from_bytes(&payload)?;
        self.records_read += 1;
        Ok(Some(observation))
    }

    /// Read every remaining observation into memory.
    pub fn read_all(&mut self) -> Result<Vec<Observation>> {
        let mut out = Vec::new();
        while let Some(obs) = self.next_record()? {
            out.push(obs);
        }
        Ok(out)
    }

    /// Reset to the first record.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        self.records_read = 0;
        Ok(())
    }
}

/// Iterator for convenient `for obs in player { }` loops.
impl Iterator for ObslogPlayer {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(obs)) => Some(Ok(obs)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
