//! Signal observation records.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A single signal measurement taken by a moving observer.
///
/// Observations are immutable once created by the ingest boundary. The
/// timestamp is monotonic within a log; positions are WGS84 geographic
/// coordinates; signal strength is integer dBm as reported by the radio
/// layer (typical range -140..-20).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Timestamp in milliseconds (monotonic within a log)
    pub timestamp_ms: u64,
    /// Observer latitude in degrees (WGS84)
    pub lat_deg: f64,
    /// Observer longitude in degrees (WGS84)
    pub lon_deg: f64,
    /// Received signal strength in dBm
    pub rssi_dbm: i32,
    /// Opaque cell identifier
    pub cell_id: String,
    /// Opaque technology tag (e.g. "LTE", "NR")
    pub technology: String,
}

impl Observation {
    /// Create a new observation.
    pub fn new(
        timestamp_ms: u64,
        lat_deg: f64,
        lon_deg: f64,
        rssi_dbm: i32,
        cell_id: impl Into<String>,
        technology: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_ms,
            lat_deg,
            lon_deg,
            rssi_dbm,
            cell_id: cell_id.into(),
            technology: technology.into(),
        }
    }

    /// Whether all numeric fields are finite.
    ///
    /// Ill-formed observations are dropped silently by the batch pipeline
    /// and skipped by the recursive tracker.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && self.lat_deg.abs() <= 90.0
            && self.lon_deg.abs() <= 360.0
    }

    /// Observer position as a geographic point.
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }

    /// Key identifying duplicate observations.
    ///
    /// Observations with identical `(lat, lon, cell_id)` are considered
    /// duplicates; deduplication keeps the one with the latest timestamp.
    /// Coordinates are compared by bit pattern, so only exact repeats (the
    /// platform re-reporting a cached fix) collapse.
    pub(crate) fn dedup_key(&self) -> (u64, u64, &str) {
        (
            self.lat_deg.to_bits(),
            self.lon_deg.to_bits(),
            self.cell_id.as_str(),
        )
    }
}
