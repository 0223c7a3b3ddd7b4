//! Weighted least-squares range positioning.
//!
//! Minimizes `sum_i w_i * (|p - p_i| - d_i)^2` by Gauss-Newton in the
//! tangent plane, where `d_i` comes from the path-loss inversion. The
//! normal equations are 2x2 and are solved by closed-form Cramer inversion;
//! a generic solver would be noise here.

use crate::core::types::{GeoPoint, Observation};
use crate::geo::tangent::{PlanePoint, TangentPlane};
use crate::propagation::path_loss::PathLossModel;

/// Minimum observation count for a meaningful range fit.
pub const MIN_OBSERVATIONS: usize = 3;

/// Maximum Gauss-Newton iterations.
pub const MAX_ITERATIONS: usize = 20;

/// Convergence threshold on the step norm, meters.
pub const CONVERGENCE_EPS_M: f64 = 0.1;

/// Determinant floor below which the normal equations count as singular.
pub const SINGULAR_DET_EPS: f64 = 1e-10;

/// Range guard for the Jacobian when the iterate lands on an anchor.
const MIN_JACOBIAN_RANGE_M: f64 = 1e-9;

/// Per-observation weight: down-weights far, noisier ranges.
///
/// Deliberately the ad-hoc production formula; a principled `1/sigma_d^2`
/// alternative changes behavior and must not be silently substituted.
#[inline]
pub fn range_weight(distance_m: f64) -> f64 {
    1.0 / (1.0 + distance_m / 1000.0)
}

/// WLS estimate for one observation group.
///
/// Returns `None` when fewer than [`MIN_OBSERVATIONS`] observations exist
/// or the normal equations go singular; the dispatcher falls back to the
/// centroid.
pub fn estimate(observations: &[Observation], model: &PathLossModel) -> Option<GeoPoint> {
    if observations.len() < MIN_OBSERVATIONS {
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
    solve(&anchors, &ranges).map(|p| plane.to_geo(&p))
}

/// Gauss-Newton solve in the tangent plane.
///
/// Exposed separately so the robust estimator can refit on an inlier
/// subset without re-projecting.
pub fn solve(anchors: &[PlanePoint], ranges: &[f64]) -> Option<PlanePoint> {
    if anchors.len() < MIN_OBSERVATIONS || anchors.len() != ranges.len() {
        return None;
    }

    // Start from the arithmetic mean of the anchors.
    let n = anchors.len() as f64;
    let mut px = anchors.iter().map(|p| p.x).sum::<f64>() / n;
    let mut py = anchors.iter().map(|p| p.y).sum::<f64>() / n;

    for _ in 0..MAX_ITERATIONS {
        // Accumulate the 2x2 normal equations H^T W H and H^T W r.
        let mut h00 = 0.0;
        let mut h01 = 0.0;
        let mut h11 = 0.0;
        let mut g0 = 0.0;
        let mut g1 = 0.0;

        for (anchor, &d) in anchors.iter().zip(ranges) {
            let dx = px - anchor.x;
            let dy = py - anchor.y;
            let range = (dx * dx + dy * dy).sqrt().max(MIN_JACOBIAN_RANGE_M);
            let jx = dx / range;
            let jy = dy / range;
            let residual = range - d;
            let w = range_weight(d);

            h00 += w * jx * jx;
            h01 += w * jx * jy;
            h11 += w * jy * jy;
            g0 += w * jx * residual;
            g1 += w * jy * residual;
        }

        let det = h00 * h11 - h01 * h01;
        if det.abs() < SINGULAR_DET_EPS {
            return None;
        }

        // Closed-form 2x2 inverse (Cramer).
        let step_x = (h11 * g0 - h01 * g1) / det;
        let step_y = (h00 * g1 - h01 * g0) / det;
        px -= step_x;
        py -= step_y;

        if (step_x * step_x + step_y * step_y).sqrt() < CONVERGENCE_EPS_M {
            break;
        }
    }

    if px.is_finite() && py.is_finite() {
        Some(PlanePoint::new(px, py))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SIDE: f64 = 100.0;
    const HEIGHT: f64 = 86.602_540_378_4;
    const CIRCUM_R: f64 = 57.735_026_919_0;
    const CENTER_Y: f64 = 28.867_513_459_5;

    fn equilateral() -> Vec<PlanePoint> {
        vec![
            PlanePoint::new(0.0, 0.0),
            PlanePoint::new(SIDE, 0.0),
            PlanePoint::new(SIDE / 2.0, HEIGHT),
        ]
    }

    #[test]
    fn test_solve_equilateral_hits_circumcenter() {
        let anchors = equilateral();
        let ranges = vec![CIRCUM_R; 3];
        let p = solve(&anchors, &ranges).unwrap();
        assert_relative_eq!(p.x, 50.0, epsilon = 0.05);
        assert_relative_eq!(p.y, CENTER_Y, epsilon = 0.05);
    }

    #[test]
    fn test_solve_underdetermined_is_none() {
        let anchors = vec![PlanePoint::new(0.0, 0.0), PlanePoint::new(100.0, 0.0)];
        let ranges = vec![50.0, 50.0];
        assert!(solve(&anchors, &ranges).is_none());
    }

    #[test]
    fn test_solve_coincident_anchors_singular() {
        // Identical anchors produce identical Jacobian rows; the normal
        // matrix is rank one and the solve must bail out.
        let anchors = vec![
            PlanePoint::new(10.0, 10.0),
            PlanePoint::new(10.0, 10.0),
            PlanePoint::new(10.0, 10.0),
        ];
        let ranges = vec![30.0; 3];
        assert!(solve(&anchors, &ranges).is_none());
    }

    #[test]
    fn test_solve_weights_follow_source_formula() {
        assert_relative_eq!(range_weight(0.0), 1.0);
        assert_relative_eq!(range_weight(1000.0), 0.5);
        assert_relative_eq!(range_weight(3000.0), 0.25);
    }

    #[test]
    fn test_estimate_too_few_observations() {
        let observations = vec![
            Observation::new(0, 35.0, 139.0, -80, "c", "LTE"),
            Observation::new(1, 35.001, 139.0, -80, "c", "LTE"),
        ];
        assert!(estimate(&observations, &PathLossModel::default()).is_none());
    }

    #[test]
    fn test_solve_offset_target() {
        // Anchors around a target at (20, -10); exact ranges recover it.
        let target = PlanePoint::new(20.0, -10.0);
        let anchors = vec![
            PlanePoint::new(-50.0, 0.0),
            PlanePoint::new(80.0, 30.0),
            PlanePoint::new(10.0, -90.0),
            PlanePoint::new(40.0, 60.0),
        ];
        let ranges: Vec<f64> = anchors.iter().map(|a| a.distance(&target)).collect();
        let p = solve(&anchors, &ranges).unwrap();
        assert_relative_eq!(p.x, target.x, epsilon = 0.05);
        assert_relative_eq!(p.y, target.y, epsilon = 0.05);
    }
}
