//! Geographic-frame wrapper around the RSSI EKF.
//!
//! The filter itself works in a fixed UTM frame; real observation streams
//! arrive as geographic coordinates. [`TowerTracker`] owns the projection
//! bookkeeping: the first well-formed observation establishes the frame,
//! and every later position is projected into that same frame even when the
//! observer wanders across a zone boundary.

use crate::core::types::{GeoPoint, Observation, TrackingStatus, UtmFrame};
use crate::geo::utm;

use super::ekf::{EkfConfig, RssiEkf};

/// Tracks one cell's base station from a stream of observations.
///
/// # Example
///
/// ```
/// use disha_locate::core::types::Observation;
/// use disha_locate::tracking::tracker::TowerTracker;
///
/// let mut tracker = TowerTracker::default();
/// tracker.observe(&Observation::new(0, 35.6812, 139.7671, -85, "cell-a", "LTE"));
/// let status = tracker.status();
/// assert_eq!(status.measurement_count, 1);
/// assert!(status.position.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TowerTracker {
    ekf: RssiEkf,
    last_user: Option<GeoPoint>,
    last_rssi_dbm: Option<i32>,
    measurement_count: u64,
}

impl TowerTracker {
    /// Create a tracker with the given filter configuration.
    pub fn new(config: EkfConfig) -> Self {
        Self {
            ekf: RssiEkf::new(config),
            last_user: None,
            last_rssi_dbm: None,
            measurement_count: 0,
        }
    }

    /// The underlying filter.
    pub fn ekf(&self) -> &RssiEkf {
        &self.ekf
    }

    /// UTM frame captured on the first observation.
    pub fn frame(&self) -> Option<UtmFrame> {
        self.ekf.frame()
    }

    /// Feed one observation into the filter.
    ///
    /// Ill-formed observations are skipped. The first accepted observation
    /// captures the filter frame; later positions are projected into that
    /// frame regardless of their natural zone.
    pub fn observe(&mut self, observation: &Observation) {
        if !observation.is_well_formed() {
            log::warn!(
                "ill-formed observation for cell {} skipped",
                observation.cell_id
            );
            return;
        }

        let position = observation.position();
        let user = match self.ekf.frame() {
            Some(frame) => utm::forward_in_frame(&position, frame),
            None => utm::forward(&position),
        };

        self.ekf.step(&user, observation.rssi_dbm as f64);
        self.last_user = Some(position);
        self.last_rssi_dbm = Some(observation.rssi_dbm);
        self.measurement_count += 1;
    }

    /// Snapshot of the current tracking state.
    pub fn status(&self) -> TrackingStatus {
        let (p0, eta) = self.ekf.path_loss_parameters();
        TrackingStatus {
            position: self.ekf.estimated_position(),
            error_radius_m: self.ekf.error_radius_m(),
            ref_power_dbm: p0,
            path_loss_exponent: eta,
            last_user: self.last_user,
            last_rssi_dbm: self.last_rssi_dbm,
            measurement_count: self.measurement_count,
        }
    }

    /// Drop all state; the next observation re-initializes the filter.
    pub fn reset(&mut self) {
        self.ekf.reset();
        self.last_user = None;
        self.last_rssi_dbm = None;
        self.measurement_count = 0;
    }
}

impl Default for TowerTracker {
    fn default() -> Self {
        Self::new(EkfConfig::default())
    }
}
