//! Geometry: global UTM projection and local tangent planes.
//!
//! The recursive tracker does all filtering in a UTM frame captured at
//! initialization; the batch estimators use a lightweight equirectangular
//! tangent plane centered on the observation cluster, which is adequate for
//! the sub-kilometer spreads drive-test logs produce.

pub mod tangent;
pub mod utm;
