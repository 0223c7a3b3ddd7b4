//! Self-calibrating RSSI Extended Kalman Filter.
//!
//! Tracks a single stationary base station and the two parameters of the
//! log-distance path-loss model from `(user position, RSSI)` measurement
//! pairs. The state vector is
//!
//! ```text
//! x = (x_b, y_b, P0, eta)
//! ```
//!
//! with `(x_b, y_b)` the station easting/northing in the UTM frame captured
//! at initialization, `P0` the reference power at one meter (dBm) and `eta`
//! the path-loss exponent. The scalar measurement function is
//!
//! ```text
//! h(x) = P0 - 10 * eta * log10(d),   d = |(x_b, y_b) - (u_x, u_y)|
//! ```
//!
//! The station is assumed stationary, so prediction is the identity with a
//! small diagonal process noise that lets the parameters drift slowly.
//!
//! # Frame capture
//!
//! The filter records the zone and hemisphere of the first position it sees
//! and keeps them for its whole life. All inverse projections use that
//! frame, and measurements expressed in any other frame are skipped with a
//! warning. Hard-coding a zone here instead is a latent bug when the
//! observer drives near a zone boundary.
//!
//! # Failure semantics
//!
//! `step` never panics and never returns an error. Ill-formed inputs and
//! degenerate innovation covariances skip the step and surface a warning
//! through the `log` facade. An uninitialized filter initializes itself from
//! the first measurement's position.

use serde::{Deserialize, Serialize};
use std::f64::consts::LN_10;

use super::matrix::Matrix4;
use crate::core::types::{GeoPoint, UtmFrame, UtmPoint};
use crate::geo::utm;

/// Distance floor for the measurement model, meters.
///
/// Prevents a Jacobian singularity when the observer is colocated with the
/// current station estimate.
const MIN_RANGE_M: f64 = 1.0;

/// Configuration for the RSSI EKF.
///
/// The defaults reproduce the filter the production logger runs: a slow
/// parameter-drift process noise, a 3 dB measurement standard deviation and
/// an uninformative initial covariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EkfConfig {
    /// Diagonal process noise added to every state each step.
    ///
    /// Expresses drift tolerance for slow parameter adaptation.
    #[serde(default = "default_process_noise")]
    pub process_noise: f64,

    /// Measurement variance in dB^2 (default 9.0, i.e. ~3 dB std).
    #[serde(default = "default_measurement_variance")]
    pub measurement_variance: f64,

    /// Initial variance on every state component.
    #[serde(default = "default_initial_variance")]
    pub initial_state_variance: f64,

    /// Initial reference-power guess at 1 m, dBm.
    #[serde(default = "default_initial_ref_power")]
    pub initial_ref_power_dbm: f64,

    /// Initial path-loss exponent guess.
    #[serde(default = "default_initial_exponent")]
    pub initial_path_loss_exponent: f64,
}

fn default_process_noise() -> f64 {
    1e-5
}
fn default_measurement_variance() -> f64 {
    9.0
}
fn default_initial_variance() -> f64 {
    1000.0
}
fn default_initial_ref_power() -> f64 {
    -40.0
}
fn default_initial_exponent() -> f64 {
    3.0
}

impl Default for EkfConfig {
    fn default() -> Self {
        Self {
            process_noise: default_process_noise(),
            measurement_variance: default_measurement_variance(),
            initial_state_variance: default_initial_variance(),
            initial_ref_power_dbm: default_initial_ref_power(),
            initial_path_loss_exponent: default_initial_exponent(),
        }
    }
}

/// Extended Kalman Filter over `(x_b, y_b, P0, eta)`.
///
/// # Example
///
/// ```
/// use disha_locate::core::types::GeoPoint;
/// use disha_locate::geo::utm;
/// use disha_locate::tracking::ekf::{EkfConfig, RssiEkf};
///
/// let mut ekf = RssiEkf::new(EkfConfig::default());
/// let user = utm::forward(&GeoPoint::new(35.6812, 139.7671));
/// ekf.step(&user, -85.0); // auto-initializes on first measurement
/// assert!(ekf.is_initialized());
/// assert!(ekf.error_radius_m().is_finite());
/// ```
///
/// Not re-entrant: concurrent calls on one instance must be serialized by
/// the caller. Distinct instances are fully independent.
#[derive(Debug, Clone)]
pub struct RssiEkf {
    config: EkfConfig,
    /// State vector (x_b, y_b, P0, eta)
    x: [f64; 4],
    /// State covariance
    p: Matrix4,
    /// UTM frame captured at initialization; `None` while uninitialized
    frame: Option<UtmFrame>,
}

impl RssiEkf {
    /// Create an uninitialized filter.
    pub fn new(config: EkfConfig) -> Self {
        Self {
            config,
            x: [
                0.0,
                0.0,
                config.initial_ref_power_dbm,
                config.initial_path_loss_exponent,
            ],
            p: Matrix4::scaled_identity(config.initial_state_variance),
            frame: None,
        }
    }

    /// The filter configuration.
    pub fn config(&self) -> &EkfConfig {
        &self.config
    }

    /// Whether the filter has been initialized.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.frame.is_some()
    }

    /// UTM frame captured at initialization.
    #[inline]
    pub fn frame(&self) -> Option<UtmFrame> {
        self.frame
    }

    /// Initialize the filter at the given observer position.
    ///
    /// The station estimate starts at the observer, the path-loss parameters
    /// at their configured guesses, and the covariance at a scaled identity.
    /// The position's zone and hemisphere become the filter's fixed frame.
    pub fn initialize(&mut self, user: &UtmPoint) {
        self.x = [
            user.easting_m,
            user.northing_m,
            self.config.initial_ref_power_dbm,
            self.config.initial_path_loss_exponent,
        ];
        self.p = Matrix4::scaled_identity(self.config.initial_state_variance);
        self.frame = Some(user.frame);
    }

    /// Return to the uninitialized state.
    ///
    /// The next `step` re-initializes from its measurement.
    pub fn reset(&mut self) {
        let config = self.config;
        *self = Self::new(config);
    }

    /// One predict-update iteration for a measurement taken at `user`.
    ///
    /// Auto-initializes if the filter is uninitialized. Skips (with a
    /// warning) measurements that are non-finite, expressed in a different
    /// frame than the one captured at initialization, or that produce a
    /// non-positive innovation covariance.
    pub fn step(&mut self, user: &UtmPoint, rssi_dbm: f64) {
        if !rssi_dbm.is_finite() || !user.easting_m.is_finite() || !user.northing_m.is_finite() {
            log::warn!("non-finite measurement dropped (rssi={rssi_dbm})");
            return;
        }

        if self.frame.is_none() {
            self.initialize(user);
        }
        let frame = match self.frame {
            Some(frame) => frame,
            None => return,
        };
        if frame != user.frame {
            log::warn!(
                "measurement in frame {} does not match filter frame {}; step skipped",
                user.frame,
                frame
            );
            return;
        }

        // Predict: stationary target, P <- P + Q.
        self.p.add_diagonal(self.config.process_noise);

        // Measurement prediction and Jacobian at the prior mean.
        let d = self.range_to(user.easting_m, user.northing_m);
        let predicted = self.x[2] - 10.0 * self.x[3] * d.log10();
        let h = Self::jacobian(&self.x, user.easting_m, user.northing_m);

        // Scalar innovation update.
        let pht = self.p.mul_vec(&h);
        let s = h[0] * pht[0]
            + h[1] * pht[1]
            + h[2] * pht[2]
            + h[3] * pht[3]
            + self.config.measurement_variance;
        if s <= 0.0 {
            log::warn!("non-positive innovation covariance ({s}); step skipped");
            return;
        }

        let k = [pht[0] / s, pht[1] / s, pht[2] / s, pht[3] / s];
        let innovation = rssi_dbm - predicted;
        for i in 0..4 {
            self.x[i] += k[i] * innovation;
        }

        // P <- (I - K H) P, using H P = (P H^T)^T while P is symmetric,
        // then re-symmetrize against floating-point drift.
        self.p.sub_outer(&k, &pht);
        self.p.symmetrize();
    }

    /// Current station estimate in the captured frame.
    pub fn estimated_position_utm(&self) -> Option<UtmPoint> {
        self.frame
            .map(|frame| UtmPoint::new(self.x[0], self.x[1], frame))
    }

    /// Current station estimate in geographic coordinates.
    ///
    /// Inverse-projects through the frame captured at initialization.
    pub fn estimated_position(&self) -> Option<GeoPoint> {
        self.estimated_position_utm().map(|utm| utm::inverse(&utm))
    }

    /// One-sigma-RMS error radius `sqrt(P11 + P22)` in meters.
    ///
    /// Infinite while uninitialized. Display aid only; it is not calibrated
    /// to a specific confidence level.
    pub fn error_radius_m(&self) -> f64 {
        if self.frame.is_none() {
            return f64::INFINITY;
        }
        (self.p.get(0, 0) + self.p.get(1, 1)).sqrt()
    }

    /// Standard deviations of the position components, meters.
    pub fn position_uncertainty(&self) -> (f64, f64) {
        if self.frame.is_none() {
            return (f64::INFINITY, f64::INFINITY);
        }
        (self.p.get(0, 0).sqrt(), self.p.get(1, 1).sqrt())
    }

    /// Current path-loss parameters `(P0, eta)`.
    pub fn path_loss_parameters(&self) -> (f64, f64) {
        (self.x[2], self.x[3])
    }

    /// Copy of the 4x4 state covariance.
    pub fn covariance(&self) -> Matrix4 {
        self.p
    }

    /// Distance from the station estimate to the observer, floored at 1 m.
    #[inline]
    fn range_to(&self, ux: f64, uy: f64) -> f64 {
        let dx = self.x[0] - ux;
        let dy = self.x[1] - uy;
        (dx * dx + dy * dy).sqrt().max(MIN_RANGE_M)
    }

    /// Measurement function `h(x)` for an observer at `(ux, uy)`.
    fn measurement(x: &[f64; 4], ux: f64, uy: f64) -> f64 {
        let dx = x[0] - ux;
        let dy = x[1] - uy;
        let d = (dx * dx + dy * dy).sqrt().max(MIN_RANGE_M);
        x[2] - 10.0 * x[3] * d.log10()
    }

    /// Measurement Jacobian `H = dh/dx` at the given state.
    ///
    /// The sign on the position partials follows from the chain rule on
    /// `log10(d)`; flipping it makes the filter diverge.
    fn jacobian(x: &[f64; 4], ux: f64, uy: f64) -> [f64; 4] {
        let dx = x[0] - ux;
        let dy = x[1] - uy;
        let d = (dx * dx + dy * dy).sqrt().max(MIN_RANGE_M);
        let c = -(10.0 * x[3]) / (LN_10 * d * d);
        [c * dx, c * dy, 1.0, -10.0 * d.log10()]
    }
}

impl Default for RssiEkf {
    fn default() -> Self {
        Self::new(EkfConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Hemisphere;
    use crate::utils::sim::SimpleRng;
    use approx::assert_relative_eq;

    fn test_frame() -> UtmFrame {
        UtmFrame::new(54, Hemisphere::North)
    }

    fn utm(e: f64, n: f64) -> UtmPoint {
        UtmPoint::new(e, n, test_frame())
    }

    #[test]
    fn test_uninitialized_getters() {
        let ekf = RssiEkf::default();
        assert!(!ekf.is_initialized());
        assert!(ekf.estimated_position_utm().is_none());
        assert!(ekf.estimated_position().is_none());
        assert!(ekf.error_radius_m().is_infinite());
        let (sx, sy) = ekf.position_uncertainty();
        assert!(sx.is_infinite() && sy.is_infinite());
        let (p0, eta) = ekf.path_loss_parameters();
        assert_relative_eq!(p0, -40.0);
        assert_relative_eq!(eta, 3.0);
    }

    #[test]
    fn test_auto_initialize_on_step() {
        let mut ekf = RssiEkf::default();
        ekf.step(&utm(500_000.0, 3_950_000.0), -85.0);
        assert!(ekf.is_initialized());
        assert_eq!(ekf.frame(), Some(test_frame()));
        let pos = ekf.estimated_position_utm().unwrap();
        assert_relative_eq!(pos.easting_m, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut ekf = RssiEkf::default();
        ekf.step(&utm(500_000.0, 3_950_000.0), -85.0);
        ekf.reset();
        assert!(!ekf.is_initialized());
        assert!(ekf.error_radius_m().is_infinite());
        // Next step re-initializes at the new position.
        ekf.step(&utm(510_000.0, 3_960_000.0), -90.0);
        let pos = ekf.estimated_position_utm().unwrap();
        assert_relative_eq!(pos.easting_m, 510_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_jacobian_reference_point() {
        // State (1000, 2000, -40, 3) with the observer 100 m southwest:
        // d = sqrt(20000) m, position partials -0.0651441, range partial
        // -21.50515, predicted RSSI -104.5154 dBm.
        let x = [1000.0, 2000.0, -40.0, 3.0];
        let h = RssiEkf::jacobian(&x, 900.0, 1900.0);
        assert_relative_eq!(h[0], -0.0651441, epsilon = 1e-6);
        assert_relative_eq!(h[1], -0.0651441, epsilon = 1e-6);
        assert_relative_eq!(h[2], 1.0);
        assert_relative_eq!(h[3], -21.50515, epsilon = 1e-4);
        assert_relative_eq!(
            RssiEkf::measurement(&x, 900.0, 1900.0),
            -104.5154,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_jacobian_matches_numeric_differentiation() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..50 {
            let x = [
                1000.0 + 500.0 * rng.gen_f64(),
                2000.0 + 500.0 * rng.gen_f64(),
                -60.0 + 30.0 * rng.gen_f64(),
                2.0 + 2.0 * rng.gen_f64(),
            ];
            let ux = 1000.0 + 2000.0 * rng.gen_f64();
            let uy = 2000.0 + 2000.0 * rng.gen_f64();
            let analytic = RssiEkf::jacobian(&x, ux, uy);
            for i in 0..4 {
                let eps = 1e-4 * x[i].abs().max(1.0);
                let mut lo = x;
                let mut hi = x;
                lo[i] -= eps;
                hi[i] += eps;
                let numeric = (RssiEkf::measurement(&hi, ux, uy)
                    - RssiEkf::measurement(&lo, ux, uy))
                    / (2.0 * eps);
                let scale = analytic[i].abs().max(1e-6);
                assert!(
                    (numeric - analytic[i]).abs() / scale < 1e-4,
                    "component {}: numeric {} vs analytic {}",
                    i,
                    numeric,
                    analytic[i]
                );
            }
        }
    }

    #[test]
    fn test_one_step_zero_displacement() {
        // With the observer exactly at the initial estimate the range clamps
        // to 1 m, the predicted RSSI is the initial P0, and a matching
        // measurement leaves the state untouched while still tightening the
        // covariance along the P0 direction.
        let mut ekf = RssiEkf::default();
        let user = utm(500_000.0, 3_950_000.0);
        ekf.initialize(&user);
        ekf.step(&user, -40.0);

        let pos = ekf.estimated_position_utm().unwrap();
        assert_eq!(pos.easting_m, 500_000.0);
        assert_eq!(pos.northing_m, 3_950_000.0);
        let (p0, eta) = ekf.path_loss_parameters();
        assert_eq!(p0, -40.0);
        assert_eq!(eta, 3.0);

        let p = ekf.covariance();
        // Position variances only gained the process noise.
        assert_relative_eq!(p.get(0, 0), 1000.0 + 1e-5, epsilon = 1e-9);
        assert_relative_eq!(p.get(1, 1), 1000.0 + 1e-5, epsilon = 1e-9);
        // P0 variance collapsed: the measurement was fully informative.
        assert!(p.get(2, 2) < 10.0);
        // eta untouched at d = 1 (log10(1) = 0 kills its partial).
        assert_relative_eq!(p.get(3, 3), 1000.0 + 1e-5, epsilon = 1e-9);
    }

    #[test]
    fn test_covariance_stays_symmetric_psd_diagonal() {
        let mut ekf = RssiEkf::default();
        let mut rng = SimpleRng::new(99);
        for _ in 0..200 {
            let user = utm(
                500_000.0 + 1000.0 * rng.gen_standard_normal(),
                3_950_000.0 + 1000.0 * rng.gen_standard_normal(),
            );
            let rssi = -90.0 + 20.0 * rng.gen_standard_normal();
            ekf.step(&user, rssi);

            let p = ekf.covariance();
            assert!(p.max_asymmetry() < 1e-9);
            for i in 0..4 {
                assert!(p.get(i, i) >= 0.0, "negative variance at {}", i);
            }
        }
    }

    #[test]
    fn test_frame_mismatch_skips_step() {
        let mut ekf = RssiEkf::default();
        ekf.step(&utm(500_000.0, 3_950_000.0), -85.0);
        let before = ekf.covariance();

        let other = UtmPoint::new(500_100.0, 3_950_100.0, UtmFrame::new(55, Hemisphere::North));
        ekf.step(&other, -70.0);

        // Nothing moved: frame 55N was rejected.
        assert_eq!(ekf.covariance(), before);
        assert_eq!(ekf.frame(), Some(test_frame()));
    }

    #[test]
    fn test_non_finite_measurement_skipped() {
        let mut ekf = RssiEkf::default();
        ekf.step(&utm(f64::NAN, 3_950_000.0), -85.0);
        assert!(!ekf.is_initialized());
        ekf.step(&utm(500_000.0, 3_950_000.0), f64::NAN);
        assert!(!ekf.is_initialized());
    }

    #[test]
    fn test_identical_steps_are_deterministic() {
        let mut a = RssiEkf::default();
        let mut b = RssiEkf::default();
        let inputs = [
            (500_000.0, 3_950_000.0, -80.0),
            (500_050.0, 3_950_020.0, -84.0),
            (500_120.0, 3_950_090.0, -88.0),
        ];
        for &(e, n, z) in &inputs {
            a.step(&utm(e, n), z);
            b.step(&utm(e, n), z);
        }
        assert_eq!(a.covariance(), b.covariance());
        assert_eq!(a.path_loss_parameters(), b.path_loss_parameters());
    }

    #[test]
    fn test_estimated_position_roundtrips_frame() {
        let geo = GeoPoint::new(35.6812, 139.7671);
        let user = utm::forward(&geo);
        let mut ekf = RssiEkf::default();
        ekf.initialize(&user);
        let back = ekf.estimated_position().unwrap();
        assert_relative_eq!(back.lat_deg, geo.lat_deg, epsilon = 1e-8);
        assert_relative_eq!(back.lon_deg, geo.lon_deg, epsilon = 1e-8);
    }
}
