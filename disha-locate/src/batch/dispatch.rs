//! Method dispatch and result assembly for batch estimation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::types::{CellEstimate, GeoPoint, Observation};
use crate::propagation::path_loss::PathLossModel;

use super::{centroid, intersection, robust, wls};

/// Batch estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMethod {
    /// Power-weighted centroid of observer positions
    Centroid,
    /// Circle-intersection density voting
    Intersection,
    /// Gauss-Newton weighted least squares
    Wls,
    /// WLS with MAD outlier rejection (recommended default)
    Robust,
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EstimationMethod::Centroid => "centroid",
            EstimationMethod::Intersection => "intersection",
            EstimationMethod::Wls => "wls",
            EstimationMethod::Robust => "robust",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EstimationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "centroid" => Ok(EstimationMethod::Centroid),
            "intersection" => Ok(EstimationMethod::Intersection),
            "wls" => Ok(EstimationMethod::Wls),
            "robust" => Ok(EstimationMethod::Robust),
            other => Err(format!("unknown estimation method: {other}")),
        }
    }
}

/// Configuration for batch estimation.
///
/// Loadable from TOML; every field has the production default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Path-loss exponent used for range inversion
    #[serde(default = "default_exponent")]
    pub path_loss_exponent: f64,

    /// Reference received power at the reference distance, dBm
    #[serde(default = "default_ref_rssi")]
    pub reference_rssi_dbm: f64,

    /// Reference distance of the path-loss model, meters
    #[serde(default = "default_ref_distance")]
    pub reference_distance_m: f64,

    /// Ball radius for circle-intersection voting, meters
    #[serde(default = "default_bandwidth")]
    pub cluster_bandwidth_m: f64,

    /// Rejection gate for the robust estimator, in MAD units
    #[serde(default = "default_outlier_threshold")]
    pub outlier_threshold_mad: f64,

    /// Estimation method
    #[serde(default = "default_method")]
    pub method: EstimationMethod,
}

fn default_exponent() -> f64 {
    2.0
}
fn default_ref_rssi() -> f64 {
    -40.0
}
fn default_ref_distance() -> f64 {
    1.0
}
fn default_bandwidth() -> f64 {
    150.0
}
fn default_outlier_threshold() -> f64 {
    2.5
}
fn default_method() -> EstimationMethod {
    EstimationMethod::Robust
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            path_loss_exponent: default_exponent(),
            reference_rssi_dbm: default_ref_rssi(),
            reference_distance_m: default_ref_distance(),
            cluster_bandwidth_m: default_bandwidth(),
            outlier_threshold_mad: default_outlier_threshold(),
            method: default_method(),
        }
    }
}

impl BatchConfig {
    /// Path-loss model described by this configuration.
    pub fn path_loss_model(&self) -> PathLossModel {
        PathLossModel::new(
            self.path_loss_exponent,
            self.reference_rssi_dbm,
            self.reference_distance_m,
        )
    }
}

/// Estimate one position per cell group.
///
/// Groups with fewer than two observations use the centroid regardless of
/// the configured method; otherwise the configured method runs and any
/// numerical failure (null estimate) falls back to the centroid. One
/// output record per group, in the iteration order of the input map, with
/// position fields absent when every estimator failed.
pub fn estimate_positions(
    groups: &BTreeMap<String, Vec<Observation>>,
    config: &BatchConfig,
) -> Vec<CellEstimate> {
    let model = config.path_loss_model();
    groups
        .iter()
        .map(|(cell_id, observations)| {
            let position = estimate_group(observations, config, &model);
            let technology = observations
                .iter()
                .max_by_key(|o| o.timestamp_ms)
                .map(|o| o.technology.clone())
                .unwrap_or_default();
            CellEstimate {
                cell_id: cell_id.clone(),
                technology,
                lat_deg: position.map(|p| p.lat_deg),
                lon_deg: position.map(|p| p.lon_deg),
                observation_count: observations.len(),
            }
        })
        .collect()
}

/// Run the configured method for one group, falling back to the centroid.
fn estimate_group(
    observations: &[Observation],
    config: &BatchConfig,
    model: &PathLossModel,
) -> Option<GeoPoint> {
    let method = if observations.len() < 2 {
        EstimationMethod::Centroid
    } else {
        config.method
    };

    let primary = match method {
        EstimationMethod::Centroid => return centroid::estimate(observations, model),
        EstimationMethod::Intersection => {
            intersection::estimate(observations, model, config.cluster_bandwidth_m)
        }
        EstimationMethod::Wls => wls::estimate(observations, model),
        EstimationMethod::Robust => {
            robust::estimate(observations, model, config.outlier_threshold_mad)
        }
    };

    if primary.is_none() {
        log::debug!("{method} estimation failed; falling back to centroid");
        return centroid::estimate(observations, model);
    }
    primary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::grouping::{GroupingConfig, group_observations};
    use approx::assert_relative_eq;

    fn obs(t: u64, lat: f64, lon: f64, rssi: i32, cell: &str) -> Observation {
        Observation::new(t, lat, lon, rssi, cell, "LTE")
    }

    #[test]
    fn test_single_observation_uses_centroid() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "C".to_string(),
            vec![obs(0, 35.681200, 139.767100, -80, "C")],
        );
        let config = BatchConfig {
            method: EstimationMethod::Centroid,
            ..BatchConfig::default()
        };

        let estimates = estimate_positions(&groups, &config);
        assert_eq!(estimates.len(), 1);
        let e = &estimates[0];
        assert_eq!(e.cell_id, "C");
        assert_eq!(e.observation_count, 1);
        assert_relative_eq!(e.lat_deg.unwrap(), 35.681200, epsilon = 1e-12);
        assert_relative_eq!(e.lon_deg.unwrap(), 139.767100, epsilon = 1e-12);
    }

    #[test]
    fn test_wls_underdetermined_falls_back_to_centroid() {
        // Two observations cannot support a WLS fit; the dispatcher must
        // hand back exactly their centroid.
        let observations = vec![
            obs(0, 35.000, 139.000, -80, "C"),
            obs(1, 35.002, 139.004, -80, "C"),
        ];
        let mut groups = BTreeMap::new();
        groups.insert("C".to_string(), observations.clone());
        let config = BatchConfig {
            method: EstimationMethod::Wls,
            ..BatchConfig::default()
        };

        let estimates = estimate_positions(&groups, &config);
        let model = config.path_loss_model();
        let expected = centroid::estimate(&observations, &model).unwrap();
        assert_relative_eq!(estimates[0].lat_deg.unwrap(), expected.lat_deg, epsilon = 1e-12);
        assert_relative_eq!(estimates[0].lon_deg.unwrap(), expected.lon_deg, epsilon = 1e-12);
    }

    #[test]
    fn test_one_estimate_per_group_in_order() {
        let observations = vec![
            obs(0, 35.0, 139.0, -80, "b"),
            obs(1, 35.1, 139.1, -82, "a"),
            obs(2, 36.0, 140.0, -85, "c"),
        ];
        let groups = group_observations(&observations, &GroupingConfig::default());
        let estimates = estimate_positions(&groups, &BatchConfig::default());
        let cells: Vec<&str> = estimates.iter().map(|e| e.cell_id.as_str()).collect();
        assert_eq!(cells, ["a", "b", "c"]);
    }

    #[test]
    fn test_technology_from_latest_observation() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "C".to_string(),
            vec![
                Observation::new(0, 35.0, 139.0, -80, "C", "GSM"),
                Observation::new(9, 35.001, 139.0, -80, "C", "NR"),
                Observation::new(5, 35.002, 139.0, -80, "C", "LTE"),
            ],
        );
        let estimates = estimate_positions(&groups, &BatchConfig::default());
        assert_eq!(estimates[0].technology, "NR");
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "robust".parse::<EstimationMethod>().unwrap(),
            EstimationMethod::Robust
        );
        assert_eq!(
            "centroid".parse::<EstimationMethod>().unwrap(),
            EstimationMethod::Centroid
        );
        assert!("bogus".parse::<EstimationMethod>().is_err());
    }

    #[test]
    fn test_config_from_toml_with_defaults() {
        let config: BatchConfig = toml::from_str(
            r#"
            method = "wls"
            path_loss_exponent = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.method, EstimationMethod::Wls);
        assert_relative_eq!(config.path_loss_exponent, 3.0);
        // Unspecified fields take the production defaults.
        assert_relative_eq!(config.reference_rssi_dbm, -40.0);
        assert_relative_eq!(config.cluster_bandwidth_m, 150.0);
        assert_relative_eq!(config.outlier_threshold_mad, 2.5);
    }

    #[test]
    fn test_default_method_is_robust() {
        assert_eq!(BatchConfig::default().method, EstimationMethod::Robust);
    }
}
