//! Geographic and projected coordinate types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hemisphere of a UTM coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    /// Latitude >= 0
    North,
    /// Latitude < 0 (northing carries the 10,000,000 m false offset)
    South,
}

impl Hemisphere {
    /// Hemisphere containing the given latitude.
    #[inline]
    pub fn of_latitude(lat_deg: f64) -> Self {
        if lat_deg >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::North => write!(f, "N"),
            Hemisphere::South => write!(f, "S"),
        }
    }
}

/// A UTM zone/hemisphere pair.
///
/// Coordinates from different frames are not comparable: any computation
/// combining two UTM points requires equal zone and hemisphere. The
/// recursive tracker captures its frame at initialization and rejects
/// measurements projected into any other frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmFrame {
    /// Zone number, 1..=60
    pub zone: u8,
    /// North or south hemisphere
    pub hemisphere: Hemisphere,
}

impl UtmFrame {
    /// Create a frame from zone and hemisphere.
    #[inline]
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Self {
        Self { zone, hemisphere }
    }
}

impl fmt::Display for UtmFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.zone, self.hemisphere)
    }
}

/// A geographic point in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat_deg: f64,
    /// Longitude in degrees
    pub lon_deg: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[inline]
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Whether both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat_deg.is_finite() && self.lon_deg.is_finite()
    }
}

/// A metric point in the Universal Transverse Mercator projection.
///
/// Easting and northing are meters within the frame's zone; the southern
/// hemisphere carries a +10,000,000 m false northing so both are
/// non-negative everywhere the projection is defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmPoint {
    /// Easting in meters
    pub easting_m: f64,
    /// Northing in meters
    pub northing_m: f64,
    /// Zone and hemisphere this point is expressed in
    pub frame: UtmFrame,
}

impl UtmPoint {
    /// Create a new UTM point.
    #[inline]
    pub fn new(easting_m: f64, northing_m: f64, frame: UtmFrame) -> Self {
        Self {
            easting_m,
            northing_m,
            frame,
        }
    }

    /// Euclidean distance to another point in the same frame.
    ///
    /// Meaningless across frames; callers must re-project first.
    #[inline]
    pub fn distance_to(&self, other: &UtmPoint) -> f64 {
        let de = self.easting_m - other.easting_m;
        let dn = self.northing_m - other.northing_m;
        (de * de + dn * dn).sqrt()
    }
}
