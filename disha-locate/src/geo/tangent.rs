//! Local equirectangular tangent plane.
//!
//! The batch estimators only need relative positions within one observation
//! cluster (spreads well under a kilometer), so instead of dragging the UTM
//! zone machinery through them, geometry runs in a flat plane tangent at the
//! cluster centroid:
//!
//! ```text
//! x = R * cos(lat0) * (lon - lon0)
//! y = R * (lat - lat0)          (angles in radians, R = 6,371,000 m)
//! ```

use crate::core::types::{GeoPoint, Observation};

/// Mean Earth radius used by the tangent plane, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point in a local tangent plane, meters east/north of the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanePoint {
    /// Meters east of the origin
    pub x: f64,
    /// Meters north of the origin
    pub y: f64,
}

impl PlanePoint {
    /// Create a new plane point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &PlanePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &PlanePoint) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Equirectangular tangent plane centered on a geographic origin.
#[derive(Debug, Clone, Copy)]
pub struct TangentPlane {
    origin: GeoPoint,
    cos_lat0: f64,
}

impl TangentPlane {
    /// Create a plane tangent at the given origin.
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            cos_lat0: origin.lat_deg.to_radians().cos(),
        }
    }

    /// Create a plane tangent at the centroid of the observations.
    ///
    /// Returns `None` when the slice is empty.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        if observations.is_empty() {
            return None;
        }
        let n = observations.len() as f64;
        let lat0 = observations.iter().map(|o| o.lat_deg).sum::<f64>() / n;
        let lon0 = observations.iter().map(|o| o.lon_deg).sum::<f64>() / n;
        Some(Self::new(GeoPoint::new(lat0, lon0)))
    }

    /// The plane's geographic origin.
    #[inline]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Project a geographic point into the plane.
    #[inline]
    pub fn to_plane(&self, point: &GeoPoint) -> PlanePoint {
        let x = EARTH_RADIUS_M
            * self.cos_lat0
            * (point.lon_deg - self.origin.lon_deg).to_radians();
        let y = EARTH_RADIUS_M * (point.lat_deg - self.origin.lat_deg).to_radians();
        PlanePoint::new(x, y)
    }

    /// Lift a plane point back to geographic coordinates.
    #[inline]
    pub fn to_geo(&self, point: &PlanePoint) -> GeoPoint {
        let lat = self.origin.lat_deg + (point.y / EARTH_RADIUS_M).to_degrees();
        let lon = self.origin.lon_deg
            + (point.x / (EARTH_RADIUS_M * self.cos_lat0)).to_degrees();
        GeoPoint::new(lat, lon)
    }
}
