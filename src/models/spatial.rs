use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ForecastError;
use crate::models::{StationMetadata, StationSummary};

/// Which summary statistic drives the map's color encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMetric {
    Min,
    #[default]
    Mean,
    Max,
}

impl ColorMetric {
    pub fn select(&self, summary: &StationSummary) -> f64 {
        match self {
            ColorMetric::Min => summary.min_predicted,
            ColorMetric::Mean => summary.mean_predicted,
            ColorMetric::Max => summary.max_predicted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMetric::Min => "min",
            ColorMetric::Mean => "mean",
            ColorMetric::Max => "max",
        }
    }
}

impl fmt::Display for ColorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorMetric {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "min" => Ok(ColorMetric::Min),
            "mean" | "avg" | "average" => Ok(ColorMetric::Mean),
            "max" => Ok(ColorMetric::Max),
            other => Err(ForecastError::Config(format!(
                "Unsupported color metric: {}",
                other
            ))),
        }
    }
}

/// A station that can be drawn on the map: coordinates plus its summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialEntry {
    pub station_id: String,
    pub display_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub color_metric: f64,
    pub summary: StationSummary,
}

impl SpatialEntry {
    pub fn from_join(
        station: &StationMetadata,
        summary: &StationSummary,
        metric: ColorMetric,
    ) -> Self {
        Self {
            station_id: station.station_id.clone(),
            display_name: station.display_name.clone(),
            longitude: station.longitude,
            latitude: station.latitude,
            color_metric: metric.select(summary),
            summary: summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_metric_parsing() {
        assert_eq!("mean".parse::<ColorMetric>().unwrap(), ColorMetric::Mean);
        assert_eq!("Average".parse::<ColorMetric>().unwrap(), ColorMetric::Mean);
        assert_eq!("MAX".parse::<ColorMetric>().unwrap(), ColorMetric::Max);
        assert!("median".parse::<ColorMetric>().is_err());
    }

    #[test]
    fn test_color_metric_selects_statistic() {
        let summary = StationSummary {
            station_id: "A".to_string(),
            min_predicted: 22.1,
            mean_predicted: 26.4,
            max_predicted: 31.0,
            prediction_count: 24,
        };

        assert_eq!(ColorMetric::Min.select(&summary), 22.1);
        assert_eq!(ColorMetric::Mean.select(&summary), 26.4);
        assert_eq!(ColorMetric::Max.select(&summary), 31.0);
    }
}
