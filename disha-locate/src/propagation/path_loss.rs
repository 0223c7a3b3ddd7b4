//! Log-distance path-loss model.
//!
//! The canonical model relates received power to distance as
//!
//! ```text
//! RSSI(d) = P0 - 10 * eta * log10(d / d_ref)
//! ```
//!
//! where `P0` is the received power at the reference distance `d_ref` and
//! `eta` is the dimensionless path-loss exponent (~2 in free space, 2.7-3.5
//! urban, 3-5 indoor). Inverting gives the range estimate the batch
//! estimators feed on:
//!
//! ```text
//! d = d_ref * 10^((P0 - RSSI) / (10 * eta))
//! ```
//!
//! Both directions clamp their inputs: RSSI outside [-140, -20] dBm and
//! distances outside [1, 50 000] m are past the model's usefulness, and a
//! clamped finite geometry beats a failure.

use serde::{Deserialize, Serialize};

/// Smallest usable path-loss exponent.
///
/// A degenerate configuration with `eta` near zero would blow up the
/// inversion exponent.
pub const MIN_EXPONENT: f64 = 0.1;

/// Range clamp for inverted distances, meters.
pub const MIN_DISTANCE_M: f64 = 1.0;
/// Upper range clamp for inverted distances, meters.
pub const MAX_DISTANCE_M: f64 = 50_000.0;

/// RSSI clamp applied before inversion, dBm.
pub const MIN_RSSI_DBM: f64 = -140.0;
/// Upper RSSI clamp applied before inversion, dBm.
pub const MAX_RSSI_DBM: f64 = -20.0;

/// Log-distance path-loss model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    /// Path-loss exponent `eta`
    pub exponent: f64,
    /// Received power at the reference distance, dBm
    pub ref_rssi_dbm: f64,
    /// Reference distance, meters
    pub ref_distance_m: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            exponent: 2.0,
            ref_rssi_dbm: -40.0,
            ref_distance_m: 1.0,
        }
    }
}

impl PathLossModel {
    /// Create a model with the given exponent and reference power at 1 m.
    pub fn new(exponent: f64, ref_rssi_dbm: f64, ref_distance_m: f64) -> Self {
        Self {
            exponent,
            ref_rssi_dbm,
            ref_distance_m,
        }
    }

    /// Effective exponent with the degeneracy clamp applied.
    #[inline]
    pub fn effective_exponent(&self) -> f64 {
        self.exponent.max(MIN_EXPONENT)
    }

    /// Invert a measured RSSI into a distance in meters.
    ///
    /// Always returns a strictly positive, finite value in
    /// [`MIN_DISTANCE_M`, `MAX_DISTANCE_M`].
    pub fn distance_m(&self, rssi_dbm: f64) -> f64 {
        let rssi = rssi_dbm.clamp(MIN_RSSI_DBM, MAX_RSSI_DBM);
        let eta = self.effective_exponent();
        let d = self.ref_distance_m * 10.0_f64.powf((self.ref_rssi_dbm - rssi) / (10.0 * eta));
        d.clamp(MIN_DISTANCE_M, MAX_DISTANCE_M)
    }

    /// Expected RSSI at a distance in meters (the forward model).
    ///
    /// Used by simulations and by the recursive filter's measurement
    /// prediction. No clamping: this is the raw model.
    #[inline]
    pub fn rssi_at(&self, distance_m: f64) -> f64 {
        self.ref_rssi_dbm - 10.0 * self.exponent * (distance_m / self.ref_distance_m).log10()
    }
}
