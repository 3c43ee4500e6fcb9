use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    DisplayDomain, FeatureRecord, Prediction, SeriesPoint, SpatialEntry, StationRegistry,
    StationSummary, TimeSeriesPayload,
};
use crate::processors::PipelineReport;

/// Everything computed from one load. Immutable once built; readers share
/// it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    registry: StationRegistry,
    predictions: Vec<Prediction>,
    summaries: BTreeMap<String, StationSummary>,
    spatial: Vec<SpatialEntry>,
    report: PipelineReport,
    display_domain: DisplayDomain,
    reference_values: HashMap<(String, NaiveDateTime), f64>,
    // prediction indices per station, ordered by timestamp
    series_index: HashMap<String, Vec<usize>>,
}

impl DatasetSnapshot {
    pub fn new(
        registry: StationRegistry,
        records: Vec<FeatureRecord>,
        predictions: Vec<Prediction>,
        summaries: BTreeMap<String, StationSummary>,
        spatial: Vec<SpatialEntry>,
        report: PipelineReport,
        display_domain: DisplayDomain,
    ) -> Self {
        let reference_values = records
            .into_iter()
            .filter_map(|record| {
                let value = record.observed_value?;
                Some(((record.station_id, record.timestamp), value))
            })
            .collect();

        let mut series_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, prediction) in predictions.iter().enumerate() {
            series_index
                .entry(prediction.station_id.clone())
                .or_default()
                .push(index);
        }
        for indices in series_index.values_mut() {
            indices.sort_by_key(|&i| predictions[i].timestamp);
        }

        Self {
            registry,
            predictions,
            summaries,
            spatial,
            report,
            display_domain,
            reference_values,
            series_index,
        }
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn summaries(&self) -> &BTreeMap<String, StationSummary> {
        &self.summaries
    }

    pub fn summary(&self, station_id: &str) -> Option<&StationSummary> {
        self.summaries.get(station_id)
    }

    pub fn spatial_entries(&self) -> &[SpatialEntry] {
        &self.spatial
    }

    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    pub fn display_domain(&self) -> DisplayDomain {
        self.display_domain
    }

    pub fn reference_value(&self, station_id: &str, timestamp: NaiveDateTime) -> Option<f64> {
        self.reference_values
            .get(&(station_id.to_string(), timestamp))
            .copied()
    }

    /// Chart payload for one station, or `None` when the station has no
    /// summary. Points are ordered by timestamp.
    pub fn station_series(&self, station_id: &str) -> Option<TimeSeriesPayload> {
        let summary = self.summaries.get(station_id)?;

        let display_name = self
            .registry
            .get(station_id)
            .map(|station| station.display_name.clone())
            .unwrap_or_default();

        let points: Vec<SeriesPoint> = self
            .series_index
            .get(station_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| {
                        let prediction = &self.predictions[i];
                        SeriesPoint {
                            timestamp: prediction.timestamp,
                            predicted_value: prediction.predicted_value,
                            reference_value: self.reference_value(station_id, prediction.timestamp),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(TimeSeriesPayload {
            station_id: station_id.to_string(),
            display_name,
            points,
            value_bounds: summary.value_bounds(),
            display_domain: self.display_domain.as_pair(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{DropCounts, FeatureStore, FeatureVector, FieldValue, StationMetadata};
    use crate::processors::{PredictionAggregator, SpatialBuilder};
    use crate::utils::constants::REFERENCE_FEATURE;
    use chrono::NaiveDate;
    use std::sync::Arc;

    pub fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    /// Station "96001" with two predictions (15.2, 16.8) and a station
    /// "96002" that has metadata only.
    pub fn sample_snapshot() -> DatasetSnapshot {
        let registry = StationRegistry::from_stations(vec![
            StationMetadata::new("96001", "Sta A", 100.0, -2.0),
            StationMetadata::new("96002", "Sta B", 101.0, -3.0),
        ])
        .unwrap();

        let columns: Arc<[String]> = vec![REFERENCE_FEATURE.to_string()].into();
        let records = vec![
            FeatureRecord {
                station_id: "96001".to_string(),
                timestamp: ts(1, 6),
                features: FeatureVector::new(columns.clone(), vec![FieldValue::Number(24.5)]),
                observed_value: Some(24.5),
            },
            FeatureRecord {
                station_id: "96001".to_string(),
                timestamp: ts(1, 0),
                features: FeatureVector::new(columns.clone(), vec![FieldValue::Missing]),
                observed_value: None,
            },
        ];
        let store = FeatureStore::new(columns, records, DropCounts::default());

        // deliberately out of timestamp order
        let predictions = vec![
            Prediction::new("96001", ts(1, 6), 16.8),
            Prediction::new("96001", ts(1, 0), 15.2),
        ];
        let summaries = PredictionAggregator::new().aggregate(&predictions);
        let builder = SpatialBuilder::new();
        let spatial = builder.build(&registry, &summaries);

        DatasetSnapshot::new(
            registry,
            store.into_records(),
            predictions,
            summaries,
            spatial,
            PipelineReport::default(),
            DisplayDomain::default(),
        )
    }
}
