//! Circle-intersection voting estimator.
//!
//! Every observation defines a range circle around the observer. Pairs of
//! circles intersect in up to two points; where many circles agree, their
//! intersection points pile up. The estimator scores each intersection
//! point by the summed crossing-angle weight of its neighbors inside a
//! fixed-radius ball, then returns the tent-kernel-weighted centroid of the
//! winning cluster.
//!
//! The crossing-angle weight is `clamp(h / min(d_i, d_j), 0, 1)` with `h`
//! the perpendicular half-chord: orthogonal crossings score 1, grazing
//! crossings score ~0 because their intersection points slide far along the
//! circles under small range errors. This is the production convention;
//! `|sin(theta)|` is proportional for small `h` but differs at near-tangent
//! geometries.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::types::{GeoPoint, Observation};
use crate::geo::tangent::{PlanePoint, TangentPlane};
use crate::propagation::path_loss::PathLossModel;

/// Floor on the voting ball radius, meters.
pub const MIN_BANDWIDTH_M: f64 = 5.0;

/// Center separation below which two circles count as concentric.
const MIN_CENTER_SEPARATION_M: f64 = 1e-6;

/// An intersection point with its crossing-angle weight.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WeightedPoint {
    pub point: PlanePoint,
    pub weight: f64,
}

/// Voting estimate for one observation group.
///
/// Returns `None` when no circle pair intersects; the dispatcher falls
/// back to the centroid.
pub fn estimate(
    observations: &[Observation],
    model: &PathLossModel,
    cluster_bandwidth_m: f64,
) -> Option<GeoPoint> {
    if observations.len() < 2 {
        return None;
    }
    let plane = TangentPlane::from_observations(observations)?;
    let circles: Vec<(PlanePoint, f64)> = observations
        .iter()
        .map(|o| {
            (
                plane.to_plane(&o.position()),
                model.distance_m(o.rssi_dbm as f64),
            )
        })
        .collect();

    let mut points = Vec::new();
    for i in 0..circles.len() {
        for j in (i + 1)..circles.len() {
            let (ci, ri) = circles[i];
            let (cj, rj) = circles[j];
            intersect_circles(&ci, ri, &cj, rj, &mut points);
        }
    }
    if points.is_empty() {
        return None;
    }

    let bandwidth = cluster_bandwidth_m.max(MIN_BANDWIDTH_M);
    let best = densest_point(&points, bandwidth)?;

    // Tent-kernel-weighted centroid of the winning cluster.
    let mut sum_w = 0.0;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for wp in &points {
        let dist = wp.point.distance(&best);
        if dist <= bandwidth {
            let w = wp.weight * (1.0 - dist / bandwidth);
            sum_w += w;
            sum_x += w * wp.point.x;
            sum_y += w * wp.point.y;
        }
    }
    if sum_w <= 0.0 {
        return None;
    }
    Some(plane.to_geo(&PlanePoint::new(sum_x / sum_w, sum_y / sum_w)))
}

/// Append the intersection points of two circles, if any.
///
/// Concentric, fully separate (`D > r1 + r2`) and nested
/// (`D < |r1 - r2|`) pairs contribute nothing.
pub(crate) fn intersect_circles(
    c1: &PlanePoint,
    r1: f64,
    c2: &PlanePoint,
    r2: f64,
    out: &mut Vec<WeightedPoint>,
) {
    let dx = c2.x - c1.x;
    let dy = c2.y - c1.y;
    let dist = (dx * dx + dy * dy).sqrt();

    if dist <= MIN_CENTER_SEPARATION_M || dist > r1 + r2 || dist < (r1 - r2).abs() {
        return;
    }

    // Standard closed form: a is the distance from c1 to the chord
    // midpoint, h the perpendicular half-chord.
    let a = (dist * dist + r1 * r1 - r2 * r2) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let mid_x = c1.x + a * dx / dist;
    let mid_y = c1.y + a * dy / dist;
    let off_x = -dy / dist * h;
    let off_y = dx / dist * h;

    let weight = (h / r1.min(r2)).clamp(0.0, 1.0);
    out.push(WeightedPoint {
        point: PlanePoint::new(mid_x + off_x, mid_y + off_y),
        weight,
    });
    out.push(WeightedPoint {
        point: PlanePoint::new(mid_x - off_x, mid_y - off_y),
        weight,
    });
}

/// Intersection point maximizing the summed neighbor weight within the
/// ball of the given radius.
fn densest_point(points: &[WeightedPoint], bandwidth: f64) -> Option<PlanePoint> {
    let mut tree: KdTree<f64, 2> = KdTree::new();
    for (i, wp) in points.iter().enumerate() {
        tree.add(&[wp.point.x, wp.point.y], i as u64);
    }

    let radius_sq = bandwidth * bandwidth;
    let mut best_score = f64::NEG_INFINITY;
    let mut best = None;
    for wp in points {
        let neighbors =
            tree.within_unsorted::<SquaredEuclidean>(&[wp.point.x, wp.point.y], radius_sq);
        let score: f64 = neighbors
            .iter()
            .map(|n| points[n.item as usize].weight)
            .sum();
        if score > best_score {
            best_score = score;
            best = Some(wp.point);
        }
    }
    best
}
