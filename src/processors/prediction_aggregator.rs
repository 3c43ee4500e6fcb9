use crate::models::{Prediction, StationSummary};
use crate::utils::constants::SUMMARY_DECIMALS;
use crate::utils::numeric::round_to;
use std::collections::BTreeMap;

pub struct PredictionAggregator {
    decimals: u32,
}

impl PredictionAggregator {
    pub fn new() -> Self {
        Self {
            decimals: SUMMARY_DECIMALS,
        }
    }

    pub fn with_decimals(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Group predictions by station and compute rounded min/mean/max.
    /// Non-finite values are skipped; stations left without predictions are
    /// absent from the result.
    pub fn aggregate(&self, predictions: &[Prediction]) -> BTreeMap<String, StationSummary> {
        let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut non_finite = 0usize;
        for prediction in predictions {
            if !prediction.predicted_value.is_finite() {
                non_finite += 1;
                continue;
            }
            grouped
                .entry(prediction.station_id.as_str())
                .or_default()
                .push(prediction.predicted_value);
        }

        if non_finite > 0 {
            tracing::warn!("Ignored {} non-finite predictions while aggregating", non_finite);
        }

        grouped
            .into_iter()
            .map(|(station_id, values)| {
                let summary = self.summarize(station_id, values);
                (station_id.to_string(), summary)
            })
            .collect()
    }

    fn summarize(&self, station_id: &str, mut values: Vec<f64>) -> StationSummary {
        // fixed summation order: the mean is identical for any input permutation
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let min = values[0];
        let max = values[count - 1];
        // min <= mean <= max must hold despite rounding error
        let mean = (values.iter().sum::<f64>() / count as f64).clamp(min, max);

        StationSummary {
            station_id: station_id.to_string(),
            min_predicted: round_to(min, self.decimals),
            mean_predicted: round_to(mean, self.decimals),
            max_predicted: round_to(max, self.decimals),
            prediction_count: count,
        }
    }
}

impl Default for PredictionAggregator {
    fn default() -> Self {
        Self::new()
    }
}
