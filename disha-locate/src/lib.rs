//! DishaLocate - Cell tower localization from drive-test RSSI logs
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │                    (obslog)                         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              tracking/      batch/                  │  ← Estimators
//! │        (EKF, tower tracker) (centroid, voting,      │
//! │                              WLS, robust, dispatch) │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │               geo/       propagation/               │  ← Models
//! │        (UTM, tangent)    (path loss)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Estimation paths
//!
//! Two independent estimators consume `(time, lat, lon, rssi, cell_id)`
//! observations:
//!
//! - **Recursive** ([`RssiEkf`] / [`TowerTracker`]): a self-calibrating
//!   Extended Kalman Filter that tracks a single stationary base station
//!   together with the two parameters of the log-distance path-loss model.
//!   All geometry runs in the UTM frame captured at initialization.
//! - **Batch** ([`estimate_positions`]): one-shot estimation over archived
//!   observations grouped by cell identifier, using one of four methods
//!   (centroid, circle-intersection voting, weighted least squares, robust
//!   WLS with MAD outlier rejection) in a local tangent plane.
//!
//! Both paths are pure single-threaded computations: no I/O, no globals, no
//! internal parallelism. Failures never cross the boundary as panics; they
//! surface as absent estimates.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Geometry and propagation models (depends on core)
// ============================================================================
pub mod geo;
pub mod propagation;

// ============================================================================
// Layer 3: Estimators (depends on core, geo, propagation)
// ============================================================================
pub mod batch;
pub mod tracking;

// ============================================================================
// Layer 4: I/O infrastructure (depends on core)
// ============================================================================
pub mod io;

// ============================================================================
// Shared utilities
// ============================================================================
pub mod utils;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::types::{
    CellEstimate, GeoPoint, Hemisphere, Observation, TrackingStatus, UtmFrame, UtmPoint,
};

// Geometry
pub use crate::geo::tangent::{PlanePoint, TangentPlane};
pub use crate::geo::utm;

// Propagation
pub use crate::propagation::path_loss::PathLossModel;

// Tracking
pub use crate::tracking::ekf::{EkfConfig, RssiEkf};
pub use crate::tracking::tracker::TowerTracker;

// Batch estimation
pub use crate::batch::dispatch::{BatchConfig, EstimationMethod, estimate_positions};
pub use crate::batch::grouping::{GroupingConfig, group_observations};

// I/O
pub use crate::io::obslog::{ObslogHeader, ObslogInfo, ObslogPlayer, ObslogRecorder};

// Utilities
pub use crate::utils::sim::{SimpleRng, TowerSim};
