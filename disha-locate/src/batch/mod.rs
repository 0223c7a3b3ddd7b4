//! Batch position estimation over archived observations.
//!
//! One-shot estimators that map a cell's deduplicated observation group to
//! a single position. Four methods are provided, all sharing the same
//! fallback chain:
//!
//! | Method | Idea | Degrades to |
//! |---|---|---|
//! | centroid | power-weighted mean of observer positions | null on zero weight |
//! | intersection | density voting over pairwise circle intersections | centroid |
//! | wls | Gauss-Newton range least squares | centroid |
//! | robust | WLS + MAD outlier gate + refit | centroid |
//!
//! Dispatch over the configured method, including the fallback to centroid
//! on any numerical failure, is part of the contract, not an implementation
//! shortcut.

pub mod centroid;
pub mod dispatch;
pub mod grouping;
pub mod intersection;
pub mod robust;
pub mod wls;
