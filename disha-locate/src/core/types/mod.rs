//! Core data types shared across the crate.

mod estimate;
mod geo;
mod observation;

pub use self::estimate::{CellEstimate, TrackingStatus};
pub use self::geo::{GeoPoint, Hemisphere, UtmFrame, UtmPoint};
pub use self::observation::Observation;
