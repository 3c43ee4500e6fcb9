use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::utils::constants::{DISPLAY_DOMAIN_MAX, DISPLAY_DOMAIN_MIN};

/// Absolute value range of the colorbar and range control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayDomain {
    pub min: f64,
    pub max: f64,
}

impl DisplayDomain {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ForecastError::Config(format!(
                "Display domain must be finite with min < max, got [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.min, self.max]
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for DisplayDomain {
    fn default() -> Self {
        Self {
            min: DISPLAY_DOMAIN_MIN,
            max: DISPLAY_DOMAIN_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub predicted_value: f64,
    pub reference_value: Option<f64>,
}

/// Chart and range-control payload for one selected station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPayload {
    pub station_id: String,
    pub display_name: String,
    pub points: Vec<SeriesPoint>,
    pub value_bounds: [f64; 2],
    pub display_domain: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_domain_validation() {
        assert!(DisplayDomain::new(0.0, 38.0).is_ok());
        assert!(DisplayDomain::new(38.0, 0.0).is_err());
        assert!(DisplayDomain::new(f64::NAN, 38.0).is_err());
        assert_eq!(DisplayDomain::default().as_pair(), [0.0, 38.0]);
    }
}
