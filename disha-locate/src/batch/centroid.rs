//! Power-weighted centroid estimator.
//!
//! The simplest estimator and the fallback for every other method: average
//! the observer positions, weighting each by received linear power raised
//! to `2/eta`. The exponent undoes the distance-squared-like decay of the
//! power so that near observations dominate without the far ones vanishing
//! entirely. Positions are averaged in geographic coordinates directly; at
//! the sub-kilometer spreads involved the curvature error is far below the
//! estimator's own noise.

use crate::core::math::dbm_to_milliwatts;
use crate::core::types::{GeoPoint, Observation};
use crate::propagation::path_loss::PathLossModel;

/// Weighted-centroid position estimate.
///
/// Returns `None` when the group is empty or every weight underflows to
/// zero (absurdly weak signals).
pub fn estimate(observations: &[Observation], model: &PathLossModel) -> Option<GeoPoint> {
    if observations.is_empty() {
        return None;
    }

    let exponent = 2.0 / model.effective_exponent();
    let mut sum_w = 0.0;
    let mut sum_lat = 0.0;
    let mut sum_lon = 0.0;

    for obs in observations {
        let power_mw = dbm_to_milliwatts(obs.rssi_dbm as f64);
        let w = power_mw.powf(exponent);
        sum_w += w;
        sum_lat += w * obs.lat_deg;
        sum_lon += w * obs.lon_deg;
    }

    if sum_w <= 0.0 || !sum_w.is_finite() {
        return None;
    }
    Some(GeoPoint::new(sum_lat / sum_w, sum_lon / sum_w))
}
