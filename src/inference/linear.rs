use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::inference::Regressor;
use crate::utils::constants::MODEL_SOURCE;

/// `intercept + sum(coefficient * feature)`, stored as
/// `{"feature_names": [...], "intercept": 0.0, "coefficients": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(feature_names: Vec<String>, intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        let model = Self {
            feature_names,
            intercept,
            coefficients,
        };
        model.check()?;
        Ok(model)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if !self.feature_names.is_empty() && self.feature_names.len() != self.coefficients.len() {
            return Err(ForecastError::load(
                MODEL_SOURCE,
                format!(
                    "linear model names {} features but has {} coefficients",
                    self.feature_names.len(),
                    self.coefficients.len()
                ),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::load(
                MODEL_SOURCE,
                "linear model has non-finite parameters",
            ));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.feature_names.is_empty() {
            None
        } else {
            Some(&self.feature_names)
        }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (coefficient, value)| {
                acc + coefficient * value
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel::new(vec![], 1.5, vec![2.0, -1.0]).unwrap();
        assert_eq!(model.predict(&[3.0, 4.0]), 3.5);
        assert_eq!(model.num_features(), 2);
        assert!(model.feature_names().is_none());
    }

    #[test]
    fn test_name_count_mismatch_is_rejected() {
        let result = LinearModel::new(vec!["a".into()], 0.0, vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::Load { .. })));
    }
}
