//! Robust WLS with MAD-gated outlier rejection.
//!
//! Runs the plain WLS fit, classifies observations by their absolute range
//! residual against a median/MAD gate, and refits on the inliers when the
//! gate actually removed something. One grossly inconsistent observation
//! (a mis-reported fix, a cell-id collision) otherwise drags the plain fit
//! tens of meters; this is the recommended production method.

use crate::core::types::{GeoPoint, Observation};
use crate::geo::tangent::{PlanePoint, TangentPlane};
use crate::propagation::path_loss::PathLossModel;
use crate::utils::stats::{MAD_NORMAL_SCALE, mad, median};

use super::wls;

/// MAD floor below which residuals count as identical and everything is an
/// inlier.
pub const MAD_DEGENERATE_EPS: f64 = 1e-6;

/// Robust estimate for one observation group.
///
/// Returns `None` when the initial WLS fit fails; the dispatcher falls
/// back to the centroid.
pub fn estimate(
    observations: &[Observation],
    model: &PathLossModel,
    outlier_threshold: f64,
) -> Option<GeoPoint> {
    if observations.len() < wls::MIN_OBSERVATIONS {
        return None;
    }
    let plane = TangentPlane::from_observations(observations)?;
    let anchors: Vec<PlanePoint> = observations
        .iter()
        .map(|o| plane.to_plane(&o.position()))
        .collect();
    let ranges: Vec<f64> = observations
        .iter()
        .map(|o| model.distance_m(o.rssi_dbm as f64))
        .collect();
    refine(&anchors, &ranges, outlier_threshold).map(|p| plane.to_geo(&p))
}

/// WLS fit with one round of MAD-gated inlier reselection.
///
/// The classification gate is `|r_i - median| / (1.4826 * MAD) <
/// threshold`. A refit only happens when at least [`wls::MIN_OBSERVATIONS`]
/// inliers remain and at least one outlier was removed; otherwise the
/// initial fit stands.
pub fn refine(anchors: &[PlanePoint], ranges: &[f64], threshold: f64) -> Option<PlanePoint> {
    let initial = wls::solve(anchors, ranges)?;

    let residuals: Vec<f64> = anchors
        .iter()
        .zip(ranges)
        .map(|(anchor, &d)| (anchor.distance(&initial) - d).abs())
        .collect();

    let center = median(&residuals)?;
    let spread = mad(&residuals, center)?;
    if spread < MAD_DEGENERATE_EPS {
        // All residuals agree; nothing to reject.
        return Some(initial);
    }

    let scale = MAD_NORMAL_SCALE * spread;
    let inliers: Vec<usize> = residuals
        .iter()
        .enumerate()
        .filter(|&(_, &r)| (r - center).abs() / scale < threshold)
        .map(|(i, _)| i)
        .collect();

    if inliers.len() >= wls::MIN_OBSERVATIONS && inliers.len() < anchors.len() {
        log::debug!(
            "robust fit rejected {} of {} observations",
            anchors.len() - inliers.len(),
            anchors.len()
        );
        let inlier_anchors: Vec<PlanePoint> = inliers.iter().map(|&i| anchors[i]).collect();
        let inlier_ranges: Vec<f64> = inliers.iter().map(|&i| ranges[i]).collect();
        return wls::solve(&inlier_anchors, &inlier_ranges).or(Some(initial));
    }

    Some(initial)
}
