//! Observation log files.
//!
//! A compact binary archive of observations: a fixed-size header followed
//! by length-prefixed Postcard-encoded records. This is the offline
//! artifact the batch estimators consume; recording happens wherever the
//! acquisition layer runs, estimation wherever it is convenient.

mod player;
mod recorder;
mod types;

pub use self::player::{ObslogPlayer, PlayerError};
pub use self::recorder::{ObslogRecorder, RecorderError};
pub use self::types::{HEADER_SIZE, OBSLOG_MAGIC, OBSLOG_VERSION, ObslogHeader, ObslogInfo};
