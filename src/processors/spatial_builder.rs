use crate::models::{ColorMetric, SpatialEntry, StationRegistry, StationSummary};
use serde::Serialize;
use std::collections::BTreeMap;

pub struct SpatialBuilder {
    color_metric: ColorMetric,
}

/// Station ids dropped on either side of the registry/summary join
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub stations_without_summary: Vec<String>,
    pub summaries_without_station: Vec<String>,
}

impl SpatialBuilder {
    pub fn new() -> Self {
        Self {
            color_metric: ColorMetric::default(),
        }
    }

    pub fn with_color_metric(color_metric: ColorMetric) -> Self {
        Self { color_metric }
    }

    /// Inner join of station metadata with summaries, sorted by station id.
    /// Stations missing from either side have nothing to draw and are left out.
    pub fn build(
        &self,
        registry: &StationRegistry,
        summaries: &BTreeMap<String, StationSummary>,
    ) -> Vec<SpatialEntry> {
        // Both sides iterate in id order, so the output is already sorted
        registry
            .iter()
            .filter_map(|station| {
                summaries
                    .get(&station.station_id)
                    .map(|summary| SpatialEntry::from_join(station, summary, self.color_metric))
            })
            .collect()
    }

    pub fn join_report(
        &self,
        registry: &StationRegistry,
        summaries: &BTreeMap<String, StationSummary>,
    ) -> JoinReport {
        JoinReport {
            stations_without_summary: registry
                .station_ids()
                .filter(|id| !summaries.contains_key(*id))
                .map(String::from)
                .collect(),
            summaries_without_station: summaries
                .keys()
                .filter(|id| !registry.contains(id))
                .cloned()
                .collect(),
        }
    }
}

impl Default for SpatialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationMetadata;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn summary(station_id: &str, min: f64, mean: f64, max: f64) -> StationSummary {
        StationSummary {
            station_id: station_id.to_string(),
            min_predicted: min,
            mean_predicted: mean,
            max_predicted: max,
            prediction_count: 8,
        }
    }

    #[test]
    fn test_build_is_inner_join() {
        let registry = StationRegistry::from_stations(vec![
            StationMetadata::new("A", "Sta A", 100.0, -2.0),
            StationMetadata::new("B", "Sta B", 105.0, -5.0),
        ])
        .unwrap();
        let summaries: BTreeMap<String, StationSummary> = vec![
            ("A".to_string(), summary("A", 15.2, 16.0, 16.8)),
            ("Z".to_string(), summary("Z", 20.0, 21.0, 22.0)),
        ]
        .into_iter()
        .collect();

        let builder = SpatialBuilder::new();
        let entries = builder.build(&registry, &summaries);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].station_id, "A");
        assert_eq!(entries[0].display_name, "Sta A");
        assert_eq!(entries[0].longitude, 100.0);
        assert_eq!(entries[0].latitude, -2.0);
        assert_eq!(entries[0].color_metric, 16.0);

        let report = builder.join_report(&registry, &summaries);
        assert_eq!(report.stations_without_summary, vec!["B".to_string()]);
        assert_eq!(report.summaries_without_station, vec!["Z".to_string()]);
    }

    #[test]
    fn test_color_metric_selection() {
        let registry =
            StationRegistry::from_stations(vec![StationMetadata::new("A", "Sta A", 100.0, -2.0)])
                .unwrap();
        let summaries: BTreeMap<String, StationSummary> =
            std::iter::once(("A".to_string(), summary("A", 15.2, 16.0, 16.8))).collect();

        let entries = SpatialBuilder::with_color_metric(ColorMetric::Max).build(&registry, &summaries);

        assert_eq!(entries[0].color_metric, 16.8);
    }

    proptest! {
        #[test]
        fn prop_build_contains_exactly_the_intersection(
            registry_ids in prop::collection::btree_set("[A-H]", 0..8),
            summary_ids in prop::collection::btree_set("[A-H]", 0..8),
        ) {
            let registry = StationRegistry::from_stations(registry_ids.iter().enumerate().map(|(i, id)| {
                StationMetadata::new(id.as_str(), format!("Sta {}", id), 100.0 + i as f64, -2.0 - i as f64)
            }))
            .unwrap();
            let summaries: BTreeMap<String, StationSummary> = summary_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), summary(id, i as f64, i as f64 + 1.0, i as f64 + 2.0)))
                .collect();

            let entries = SpatialBuilder::new().build(&registry, &summaries);

            let built: Vec<&str> = entries.iter().map(|e| e.station_id.as_str()).collect();
            let expected: Vec<&str> = registry_ids.intersection(&summary_ids).map(String::as_str).collect();
            prop_assert_eq!(&built, &expected);

            for entry in &entries {
                let station = registry.get(&entry.station_id).unwrap();
                let summary = &summaries[&entry.station_id];
                prop_assert_eq!(&entry.display_name, &station.display_name);
                prop_assert_eq!(entry.longitude, station.longitude);
                prop_assert_eq!(entry.latitude, station.latitude);
                prop_assert_eq!(entry.color_metric, summary.mean_predicted);
                prop_assert_eq!(&entry.summary, summary);
            }

            let unique: BTreeSet<&str> = built.iter().copied().collect();
            prop_assert_eq!(unique.len(), built.len());
        }
    }
}
