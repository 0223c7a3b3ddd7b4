//! Estimator benchmarks.
//!
//! Covers the per-measurement cost of the recursive filter and the
//! one-shot cost of each batch method on a realistic drive-test group.
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use disha_locate::batch::{centroid, intersection, robust, wls};
use disha_locate::core::types::{Hemisphere, Observation, UtmFrame, UtmPoint};
use disha_locate::geo::tangent::{PlanePoint, TangentPlane};
use disha_locate::propagation::path_loss::PathLossModel;
use disha_locate::tracking::ekf::{EkfConfig, RssiEkf};
use disha_locate::utils::sim::{SimpleRng, TowerSim};
use disha_locate::GeoPoint;

// ============================================================================
// Fixtures
// ============================================================================

/// A drive-test group: observers scattered around a tower with noisy
/// integer RSSI readings.
fn drive_test_group(count: usize) -> Vec<Observation> {
    let model = PathLossModel::default();
    let plane = TangentPlane::new(GeoPoint::new(35.68, 139.77));
    let mut rng = SimpleRng::new(7);

    (0..count)
        .map(|i| {
            let x = 400.0 * (rng.gen_f64() - 0.5);
            let y = 400.0 * (rng.gen_f64() - 0.5);
            let d = (x * x + y * y).sqrt().max(1.0);
            let rssi = (model.rssi_at(d) + 3.0 * rng.gen_standard_normal()).round() as i32;
            let geo = plane.to_geo(&PlanePoint::new(x, y));
            Observation::new(i as u64 * 2000, geo.lat_deg, geo.lon_deg, rssi, "c", "LTE")
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_ekf_step(c: &mut Criterion) {
    let frame = UtmFrame::new(54, Hemisphere::North);
    let true_model = PathLossModel::new(2.5, -45.0, 1.0);
    let mut sim = TowerSim::new(388_000.0, 3_949_000.0, true_model, 3.0, 42);

    // Pre-generate a measurement ring.
    let measurements: Vec<(UtmPoint, f64)> = (0..64)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / 64.0;
            let user = UtmPoint::new(
                388_300.0 + 300.0 * angle.cos(),
                3_949_000.0 + 300.0 * angle.sin(),
                frame,
            );
            let rssi = sim.observe(&user);
            (user, rssi)
        })
        .collect();

    c.bench_function("ekf_step_64", |b| {
        b.iter(|| {
            let mut ekf = RssiEkf::new(EkfConfig::default());
            for (user, rssi) in &measurements {
                ekf.step(user, *rssi);
            }
            black_box(ekf.error_radius_m())
        })
    });
}

fn bench_batch_methods(c: &mut Criterion) {
    let group = drive_test_group(30);
    let model = PathLossModel::default();

    c.bench_function("centroid_30", |b| {
        b.iter(|| black_box(centroid::estimate(&group, &model)))
    });

    c.bench_function("intersection_30", |b| {
        b.iter(|| black_box(intersection::estimate(&group, &model, 150.0)))
    });

    c.bench_function("wls_30", |b| {
        b.iter(|| black_box(wls::estimate(&group, &model)))
    });

    c.bench_function("robust_30", |b| {
        b.iter(|| black_box(robust::estimate(&group, &model, 2.5)))
    });
}

criterion_group!(benches, bench_ekf_step, bench_batch_methods);
criterion_main!(benches);
