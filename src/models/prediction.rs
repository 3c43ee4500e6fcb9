use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub predicted_value: f64,
}

impl Prediction {
    pub fn new(station_id: impl Into<String>, timestamp: NaiveDateTime, predicted_value: f64) -> Self {
        Self {
            station_id: station_id.into(),
            timestamp,
            predicted_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station_id: String,
    pub min_predicted: f64,
    pub mean_predicted: f64,
    pub max_predicted: f64,
    pub prediction_count: usize,
}

impl StationSummary {
    pub fn value_bounds(&self) -> [f64; 2] {
        [self.min_predicted, self.max_predicted]
    }

    pub fn is_ordered(&self) -> bool {
        self.min_predicted <= self.mean_predicted && self.mean_predicted <= self.max_predicted
    }
}
