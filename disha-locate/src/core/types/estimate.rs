//! Estimator output records.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Batch estimation result for one cell.
///
/// A missing position (`lat_deg`/`lon_deg` both `None`) means every
/// estimator in the fallback chain failed; the record is still emitted so
/// consumers see the cell and its observation count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEstimate {
    /// Cell identifier the estimate belongs to
    pub cell_id: String,
    /// Technology tag taken from the latest observation in the group
    pub technology: String,
    /// Estimated base station latitude in degrees, if estimation succeeded
    pub lat_deg: Option<f64>,
    /// Estimated base station longitude in degrees, if estimation succeeded
    pub lon_deg: Option<f64>,
    /// Number of observations used
    pub observation_count: usize,
}

impl CellEstimate {
    /// Estimated position, if estimation succeeded.
    #[inline]
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.lat_deg, self.lon_deg) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Recursive tracker state snapshot, produced after each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStatus {
    /// Estimated base station position, absent until the filter initializes
    pub position: Option<GeoPoint>,
    /// One-sigma-RMS error radius in meters (infinite before initialization).
    ///
    /// Display aid only; it does not correspond to a specific confidence
    /// level.
    pub error_radius_m: f64,
    /// Current reference power estimate at 1 m, dBm
    pub ref_power_dbm: f64,
    /// Current path-loss exponent estimate
    pub path_loss_exponent: f64,
    /// Last observer position fed to the filter
    pub last_user: Option<GeoPoint>,
    /// Last measured signal strength in dBm
    pub last_rssi_dbm: Option<i32>,
    /// Cumulative number of measurements applied
    pub measurement_count: u64,
}
