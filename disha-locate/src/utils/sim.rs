//! Deterministic simulation helpers for tests, benches and demos.
//!
//! Everything here is seeded and reproducible: simulated runs behave
//! identically across platforms and invocations, which keeps convergence
//! tests meaningful.

use crate::core::types::UtmPoint;
use crate::propagation::path_loss::PathLossModel;

/// Simple LCG-based random number generator.
///
/// LCG parameters from Numerical Recipes; not cryptographic, just cheap and
/// deterministic.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit state.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        self.state
    }

    /// Uniform f64 in [0, 1).
    #[inline]
    pub fn gen_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal sample via the Box-Muller transform.
    pub fn gen_standard_normal(&mut self) -> f64 {
        let u1 = self.gen_f64().max(1e-12);
        let u2 = self.gen_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        r * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

/// A simulated stationary transmitter with log-distance propagation and
/// Gaussian dB-domain measurement noise.
#[derive(Debug, Clone)]
pub struct TowerSim {
    /// True easting of the transmitter, meters
    pub easting_m: f64,
    /// True northing of the transmitter, meters
    pub northing_m: f64,
    /// True propagation model
    pub model: PathLossModel,
    /// Measurement noise standard deviation, dB
    pub noise_sigma_db: f64,
    rng: SimpleRng,
}

impl TowerSim {
    /// Create a simulated tower.
    pub fn new(
        easting_m: f64,
        northing_m: f64,
        model: PathLossModel,
        noise_sigma_db: f64,
        seed: u64,
    ) -> Self {
        Self {
            easting_m,
            northing_m,
            model,
            noise_sigma_db,
            rng: SimpleRng::new(seed),
        }
    }

    /// Noisy RSSI observed from a position in the tower's frame.
    pub fn observe(&mut self, user: &UtmPoint) -> f64 {
        let dx = self.easting_m - user.easting_m;
        let dy = self.northing_m - user.northing_m;
        let d = (dx * dx + dy * dy).sqrt().max(1.0);
        self.model.rssi_at(d) + self.noise_sigma_db * self.rng.gen_standard_normal()
    }
}

/// Positions along a circular walk, counter-clockwise from `start_angle_rad`.
///
/// Returns `count` evenly spaced points on the circle of `radius_m` around
/// `(center_e, center_n)`.
pub fn circular_walk(
    center_e: f64,
    center_n: f64,
    radius_m: f64,
    count: usize,
    start_angle_rad: f64,
) -> Vec<(f64, f64)> {
    (0..count)
        .map(|k| {
            let angle =
                start_angle_rad + 2.0 * std::f64::consts::PI * k as f64 / count as f64;
            (
                center_e + radius_m * angle.cos(),
                center_n + radius_m * angle.sin(),
            )
        })
        .collect()
}
