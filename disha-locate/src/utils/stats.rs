//! Robust statistics used by the outlier-rejecting estimator.

/// Scale factor relating MAD to the standard deviation of a normal
/// distribution (1 / Phi^-1(3/4)).
pub const MAD_NORMAL_SCALE: f64 = 1.4826;

/// Median of a slice, sorting a copy.
///
/// Even-length inputs return the mean of the two middle elements.
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    } else {
        Some(sorted[n / 2])
    }
}

/// Median absolute deviation around a given center.
///
/// Returns `None` for an empty slice.
pub fn mad(values: &[f64], center: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}
