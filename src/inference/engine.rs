use rayon::prelude::*;
use std::sync::Arc;

use crate::error::{ForecastError, Result};
use crate::inference::Regressor;
use crate::models::{FeatureRecord, FieldValue, Prediction};
use crate::utils::constants::{FEATURE_SOURCE, MODEL_SOURCE};

/// Wraps a pretrained model behind the canonical input schema
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    model: Arc<dyn Regressor>,
    schema: Vec<String>,
}

impl InferenceEngine {
    /// `schema` is the canonical, ordered input layout. It must match the
    /// model's cardinality, and its names when the artifact records them.
    pub fn new(model: Arc<dyn Regressor>, schema: Vec<String>) -> Result<Self> {
        if model.num_features() != schema.len() {
            return Err(ForecastError::load(
                MODEL_SOURCE,
                format!(
                    "model expects {} features, canonical schema has {}",
                    model.num_features(),
                    schema.len()
                ),
            ));
        }

        if let Some(names) = model.feature_names() {
            if names != schema.as_slice() {
                return Err(ForecastError::load(
                    MODEL_SOURCE,
                    format!(
                        "model feature names {:?} do not match the canonical schema {:?}",
                        names, schema
                    ),
                ));
            }
        }

        Ok(Self { model, schema })
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Score one projected feature vector
    pub fn predict(&self, vector: &[FieldValue]) -> Result<f64> {
        if vector.len() != self.schema.len() {
            return Err(ForecastError::inference(format!(
                "expected {} features, got {}",
                self.schema.len(),
                vector.len()
            )));
        }

        let mut inputs = Vec::with_capacity(vector.len());
        for (name, value) in self.schema.iter().zip(vector) {
            match value {
                FieldValue::Number(number) if number.is_finite() => inputs.push(*number),
                other => {
                    return Err(ForecastError::inference(format!(
                        "feature {} is not numeric: {}",
                        name, other
                    )))
                }
            }
        }

        let predicted = self.model.predict(&inputs);
        if !predicted.is_finite() {
            return Err(ForecastError::inference(format!(
                "model returned a non-finite value ({})",
                predicted
            )));
        }
        Ok(predicted)
    }

    /// Score many vectors in parallel; output order matches input order
    pub fn predict_batch(&self, vectors: &[Vec<FieldValue>]) -> Vec<Result<f64>> {
        vectors.par_iter().map(|vector| self.predict(vector)).collect()
    }

    /// Score feature records, skipping (and counting) those that fail
    pub fn predict_records(
        &self,
        projection: &FeatureProjection,
        records: &[FeatureRecord],
    ) -> InferenceOutcome {
        let results: Vec<Result<Prediction>> = records
            .par_iter()
            .map(|record| {
                let vector = projection.project(record.features.values());
                self.predict(&vector).map(|value| {
                    Prediction::new(record.station_id.clone(), record.timestamp, value)
                })
            })
            .collect();

        let mut outcome = InferenceOutcome::default();
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(prediction) => outcome.predictions.push(prediction),
                Err(e) => {
                    tracing::debug!(
                        "Skipping record {} @ {}: {}",
                        record.station_id,
                        record.timestamp,
                        e
                    );
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }
}

/// Predictions in record order, plus the count of records that failed
#[derive(Debug, Clone, Default)]
pub struct InferenceOutcome {
    pub predictions: Vec<Prediction>,
    pub skipped: usize,
}

/// Maps a feature store's column layout onto the engine schema, stripping
/// the fixed exclusion list and any other extraneous column
#[derive(Debug, Clone)]
pub struct FeatureProjection {
    indices: Vec<usize>,
}

impl FeatureProjection {
    pub fn new(columns: &[String], excluded: &[&str], schema: &[String]) -> Result<Self> {
        let conflicting: Vec<&String> = schema
            .iter()
            .filter(|name| excluded.contains(&name.as_str()))
            .collect();
        if !conflicting.is_empty() {
            return Err(ForecastError::Config(format!(
                "model inputs {:?} are also listed as excluded features",
                conflicting
            )));
        }

        let mut indices = Vec::with_capacity(schema.len());
        let mut missing = Vec::new();
        for name in schema {
            match columns.iter().position(|column| column == name) {
                Some(index) => indices.push(index),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(ForecastError::SchemaMismatch {
                source_name: FEATURE_SOURCE.to_string(),
                missing,
            });
        }

        let stripped: Vec<&String> = columns
            .iter()
            .filter(|column| !schema.contains(column))
            .collect();
        tracing::debug!("Stripping non-model columns before inference: {:?}", stripped);

        Ok(Self { indices })
    }

    pub fn project(&self, values: &[FieldValue]) -> Vec<FieldValue> {
        self.indices
            .iter()
            .map(|index| values.get(*index).cloned().unwrap_or(FieldValue::Missing))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
