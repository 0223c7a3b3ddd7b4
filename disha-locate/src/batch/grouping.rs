//! Observation grouping, deduplication and retention.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::types::Observation;

/// Configuration for observation grouping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Retention window in milliseconds, measured back from the newest
    /// observation in the input. `None` keeps everything.
    ///
    /// The live logger prunes hour-old observations from its display
    /// stream; offline batch runs usually keep the full archive.
    #[serde(default)]
    pub retention_window_ms: Option<u64>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            retention_window_ms: None,
        }
    }
}

/// Group observations by cell identifier.
///
/// - Ill-formed observations (non-finite coordinates) are dropped silently.
/// - Observations older than the retention window are dropped.
/// - Duplicates (identical `(lat, lon, cell_id)`) collapse to the one with
///   the latest timestamp.
/// - Groups come back in lexicographic cell-id order, each sorted by
///   timestamp.
pub fn group_observations(
    observations: &[Observation],
    config: &GroupingConfig,
) -> BTreeMap<String, Vec<Observation>> {
    let newest = observations
        .iter()
        .filter(|o| o.is_well_formed())
        .map(|o| o.timestamp_ms)
        .max();
    let cutoff = match (config.retention_window_ms, newest) {
        (Some(window), Some(newest)) => newest.saturating_sub(window),
        _ => 0,
    };

    // Deduplicate keeping the latest timestamp per (lat, lon, cell_id).
    let mut latest: HashMap<(u64, u64, &str), &Observation> = HashMap::new();
    let mut dropped = 0usize;
    for obs in observations {
        if !obs.is_well_formed() {
            dropped += 1;
            continue;
        }
        if obs.timestamp_ms < cutoff {
            continue;
        }
        let entry = latest.entry(obs.dedup_key()).or_insert(obs);
        if obs.timestamp_ms > entry.timestamp_ms {
            *entry = obs;
        }
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} ill-formed observations while grouping");
    }

    let mut groups: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for obs in latest.into_values() {
        groups
            .entry(obs.cell_id.clone())
            .or_default()
            .push(obs.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|o| o.timestamp_ms);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(t: u64, lat: f64, lon: f64, cell: &str) -> Observation {
        Observation::new(t, lat, lon, -80, cell, "LTE")
    }

    #[test]
    fn test_groups_by_cell_sorted() {
        let observations = vec![
            obs(3, 35.0, 139.0, "b"),
            obs(1, 35.1, 139.1, "a"),
            obs(2, 35.2, 139.2, "a"),
        ];
        let groups = group_observations(&observations, &GroupingConfig::default());
        let cells: Vec<&String> = groups.keys().collect();
        assert_eq!(cells, ["a", "b"]);
        assert_eq!(groups["a"].len(), 2);
        assert_eq!(groups["a"][0].timestamp_ms, 1);
        assert_eq!(groups["a"][1].timestamp_ms, 2);
    }

    #[test]
    fn test_dedup_keeps_latest() {
        let observations = vec![
            obs(1, 35.0, 139.0, "a"),
            obs(5, 35.0, 139.0, "a"), // same fix, newer
            obs(3, 35.0, 139.0, "a"),
        ];
        let groups = group_observations(&observations, &GroupingConfig::default());
        assert_eq!(groups["a"].len(), 1);
        assert_eq!(groups["a"][0].timestamp_ms, 5);
    }

    #[test]
    fn test_same_fix_different_cells_not_deduped() {
        let observations = vec![obs(1, 35.0, 139.0, "a"), obs(1, 35.0, 139.0, "b")];
        let groups = group_observations(&observations, &GroupingConfig::default());
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_ill_formed_dropped() {
        let observations = vec![obs(1, f64::NAN, 139.0, "a"), obs(2, 35.0, 139.0, "a")];
        let groups = group_observations(&observations, &GroupingConfig::default());
        assert_eq!(groups["a"].len(), 1);
    }

    #[test]
    fn test_retention_window() {
        let observations = vec![
            obs(1_000, 35.0, 139.0, "a"),
            obs(3_600_000, 35.1, 139.1, "a"),
            obs(7_200_000, 35.2, 139.2, "a"),
        ];
        let config = GroupingConfig {
            retention_window_ms: Some(3_600_000),
        };
        let groups = group_observations(&observations, &config);
        // Cutoff is 7_200_000 - 3_600_000; the first observation is gone.
        assert_eq!(groups["a"].len(), 2);
        assert!(groups["a"].iter().all(|o| o.timestamp_ms >= 3_600_000));
    }

    #[test]
    fn test_no_retention_keeps_all() {
        let observations = vec![obs(0, 35.0, 139.0, "a"), obs(10_000_000, 35.1, 139.1, "a")];
        let groups = group_observations(&observations, &GroupingConfig::default());
        assert_eq!(groups["a"].len(), 2);
    }
}
