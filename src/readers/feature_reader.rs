use crate::error::{ForecastError, Result};
use crate::models::{DropCounts, FeatureRecord, FeatureStore, FeatureVector, FieldValue};
use crate::readers::column_mapping::{CanonicalColumn, ColumnMapping};
use crate::utils::constants::{
    model_features, DATE_ONLY_FORMAT, DEFAULT_BUFFER_SIZE, FEATURE_SOURCE, REFERENCE_FEATURE,
    TIMESTAMP_FORMATS,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

pub struct FeatureReader {
    mapping: ColumnMapping,
    required_features: Vec<String>,
    reference_feature: String,
}

impl FeatureReader {
    pub fn new() -> Self {
        Self {
            mapping: ColumnMapping::feature_store(),
            required_features: model_features().into_iter().map(String::from).collect(),
            reference_feature: REFERENCE_FEATURE.to_string(),
        }
    }

    /// Read feature records from a CSV file
    pub fn read_store(&self, path: &Path) -> Result<FeatureStore> {
        let file = File::open(path).map_err(|e| {
            ForecastError::load(
                FEATURE_SOURCE,
                format!("cannot open {}: {}", path.display(), e),
            )
        })?;
        let store = self.read_store_from(file)?;

        let dropped = store.dropped();
        tracing::info!(
            "Loaded {} feature records ({} columns) from {}",
            store.len(),
            store.columns().len(),
            path.display()
        );
        if dropped.total() > 0 {
            tracing::warn!(
                "Dropped {} feature rows: {} unparsable timestamps, {} without station id, {} duplicate keys",
                dropped.total(),
                dropped.unparsable_timestamp,
                dropped.missing_station_id,
                dropped.duplicate_key
            );
        }

        Ok(store)
    }

    pub fn read_store_from<R: Read>(&self, reader: R) -> Result<FeatureStore> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ForecastError::load(FEATURE_SOURCE, e.to_string()))?
            .clone();

        let mut required = vec![CanonicalColumn::StationId, CanonicalColumn::Timestamp];
        required.extend(
            self.required_features
                .iter()
                .chain(std::iter::once(&self.reference_feature))
                .map(|name| CanonicalColumn::feature(name.as_str())),
        );
        let resolved = self.mapping.resolve(&headers, &required, FEATURE_SOURCE)?;

        let station_index = resolved
            .position(&CanonicalColumn::StationId)
            .ok_or_else(|| ForecastError::InvalidFormat("station id column vanished".into()))?;
        let timestamp_index = resolved
            .position(&CanonicalColumn::Timestamp)
            .ok_or_else(|| ForecastError::InvalidFormat("timestamp column vanished".into()))?;

        let feature_columns = resolved.feature_columns();
        let columns: Arc<[String]> = feature_columns
            .iter()
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>()
            .into();
        let reference_slot = feature_columns
            .iter()
            .position(|(name, _)| *name == self.reference_feature);

        let mut records = Vec::new();
        let mut seen: HashSet<(String, NaiveDateTime)> = HashSet::new();
        let mut dropped = DropCounts::default();

        for row in csv_reader.records() {
            let row = row.map_err(|e| ForecastError::load(FEATURE_SOURCE, e.to_string()))?;

            if row.iter().all(|field| field.is_empty()) {
                continue;
            }

            let station_id = row.get(station_index).unwrap_or("");
            if station_id.is_empty() {
                dropped.missing_station_id += 1;
                continue;
            }

            let raw_timestamp = row.get(timestamp_index).unwrap_or("");
            let Some(timestamp) = parse_timestamp(raw_timestamp) else {
                tracing::debug!(
                    "Dropping row for station {}: unparsable timestamp '{}'",
                    station_id,
                    raw_timestamp
                );
                dropped.unparsable_timestamp += 1;
                continue;
            };

            if !seen.insert((station_id.to_string(), timestamp)) {
                dropped.duplicate_key += 1;
                continue;
            }

            let values: Vec<FieldValue> = feature_columns
                .iter()
                .map(|(_, index)| FieldValue::parse(row.get(*index).unwrap_or("")))
                .collect();
            let observed_value = reference_slot.and_then(|slot| values[slot].as_f64());

            records.push(FeatureRecord {
                station_id: station_id.to_string(),
                timestamp,
                features: FeatureVector::new(Arc::clone(&columns), values),
                observed_value,
            });
        }

        Ok(FeatureStore::new(columns, records, dropped))
    }
}

impl Default for FeatureReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a feature-source timestamp; date-only values map to midnight
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::FEATURE_COLUMNS;
    use pretty_assertions::assert_eq;

    fn header() -> String {
        let mut columns = vec!["Date".to_string(), "lokasi".to_string(), "LAT".to_string(), "LON".to_string()];
        columns.extend(FEATURE_COLUMNS.iter().map(|(raw, _)| raw.to_string()));
        columns.join(",")
    }

    fn row(date: &str, station: &str, temperature: &str) -> String {
        let mut fields = vec![date.to_string(), station.to_string(), "-2.0".to_string(), "100.0".to_string()];
        fields.push(temperature.to_string());
        fields.extend((1..FEATURE_COLUMNS.len()).map(|i| format!("{}.5", i)));
        fields.join(",")
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-01 06:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T06:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 06:00"), Some(expected));
        assert_eq!(parse_timestamp("2024/03/01 06:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_read_store_normalizes_columns_and_strips_metadata() -> Result<()> {
        let data = format!(
            "{}\n{}\n{}\n",
            header(),
            row("2024-03-01 00:00:00", "A", "27.5"),
            row("2024-03-01 03:00:00", "A", "28.1")
        );

        let store = FeatureReader::new().read_store_from(data.as_bytes())?;

        assert_eq!(store.len(), 2);
        assert_eq!(store.columns().len(), FEATURE_COLUMNS.len());
        assert_eq!(store.columns()[0], "suhu2m.degC.");
        assert!(!store.columns().iter().any(|c| c == "LAT" || c == "latitude"));

        let record = &store.records()[1];
        assert_eq!(record.station_id, "A");
        assert_eq!(record.observed_value, Some(28.1));
        assert_eq!(record.features.get("wamix.kg.kg."), Some(&FieldValue::Number(10.5)));

        Ok(())
    }

    #[test]
    fn test_unparsable_timestamps_and_duplicates_are_counted() -> Result<()> {
        let data = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            header(),
            row("2024-03-01 00:00:00", "A", "27.5"),
            row("not-a-date", "A", "27.9"),
            row("2024-03-01 00:00:00", "A", "99.0"),
            row("2024-03-01 00:00:00", "", "27.0")
        );

        let store = FeatureReader::new().read_store_from(data.as_bytes())?;

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].observed_value, Some(27.5));
        assert_eq!(
            store.dropped(),
            DropCounts {
                unparsable_timestamp: 1,
                missing_station_id: 1,
                duplicate_key: 1,
            }
        );

        Ok(())
    }

    #[test]
    fn test_non_numeric_cells_are_kept_for_inference() -> Result<()> {
        let data = format!("{}\n{}\n", header(), row("2024-03-01 00:00:00", "A", "n/a"));

        let store = FeatureReader::new().read_store_from(data.as_bytes())?;

        let record = &store.records()[0];
        assert_eq!(record.observed_value, None);
        assert_eq!(
            record.features.get("suhu2m.degC."),
            Some(&FieldValue::NonNumeric("n/a".to_string()))
        );

        Ok(())
    }

    #[test]
    fn test_missing_model_column_is_schema_mismatch() {
        let data = "Date,lokasi,suhu2m(degC),dew2m(degC)\n2024-03-01 00:00:00,A,27.5,23.0\n";

        let result = FeatureReader::new().read_store_from(data.as_bytes());

        match result {
            Err(ForecastError::SchemaMismatch { source_name, missing }) => {
                assert_eq!(source_name, FEATURE_SOURCE);
                assert_eq!(missing.len(), 21);
                assert!(missing.contains(&"pblh.m.".to_string()));
                assert!(!missing.contains(&"lcloud...".to_string()));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }
}
