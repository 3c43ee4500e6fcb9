use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One cell of a feature row. Non-numeric cells are kept; inference rejects
/// and counts the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Number(f64),
    Missing,
    NonNumeric(String),
}

impl FieldValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed == "NA" {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::NonNumeric(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Missing => write!(f, "<missing>"),
            FieldValue::NonNumeric(raw) => write!(f, "'{}'", raw),
        }
    }
}

/// Ordered, named feature cells. Column names are shared across all records
/// of one store
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl FeatureVector {
    pub fn new(columns: Arc<[String]>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|index| &self.values[index])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub features: FeatureVector,
    pub observed_value: Option<f64>,
}

/// Rows dropped while loading the feature source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub unparsable_timestamp: usize,
    pub missing_station_id: usize,
    pub duplicate_key: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.unparsable_timestamp + self.missing_station_id + self.duplicate_key
    }
}

/// Feature records in source order, plus the canonical column layout they share
#[derive(Debug, Clone)]
pub struct FeatureStore {
    columns: Arc<[String]>,
    records: Vec<FeatureRecord>,
    dropped: DropCounts,
}

impl FeatureStore {
    pub fn new(columns: Arc<[String]>, records: Vec<FeatureRecord>, dropped: DropCounts) -> Self {
        Self {
            columns,
            records,
            dropped,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FeatureRecord> {
        self.records
    }

    pub fn dropped(&self) -> DropCounts {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_parse() {
        assert_eq!(FieldValue::parse(" 27.4 "), FieldValue::Number(27.4));
        assert_eq!(FieldValue::parse(""), FieldValue::Missing);
        assert_eq!(FieldValue::parse("NaN"), FieldValue::Missing);
        assert_eq!(
            FieldValue::parse("n/a"),
            FieldValue::NonNumeric("n/a".to_string())
        );
        assert_eq!(
            FieldValue::parse("inf"),
            FieldValue::NonNumeric("inf".to_string())
        );
    }

    #[test]
    fn test_feature_vector_lookup_by_name() {
        let columns: Arc<[String]> = vec!["suhu2m.degC.".to_string(), "rh2m...".to_string()].into();
        let vector = FeatureVector::new(
            columns,
            vec![FieldValue::Number(28.1), FieldValue::Number(74.0)],
        );

        assert_eq!(vector.get("rh2m..."), Some(&FieldValue::Number(74.0)));
        assert_eq!(vector.get("pblh.m."), None);
    }
}
