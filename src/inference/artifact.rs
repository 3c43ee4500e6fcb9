use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ForecastError, Result};
use crate::inference::{LinearModel, Regressor, TreeEnsemble};
use crate::utils::constants::MODEL_SOURCE;

/// A serialized regression model, loaded once at startup
#[derive(Debug, Clone)]
pub enum ModelArtifact {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            ForecastError::load(MODEL_SOURCE, format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded {} model with {} features from {}",
            artifact.kind(),
            artifact.num_features(),
            path.display()
        );
        Ok(artifact)
    }

    /// Detect the artifact format from its top-level keys
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ForecastError::load(MODEL_SOURCE, format!("invalid JSON: {}", e)))?;

        if value.get("learner").is_some() {
            return Ok(ModelArtifact::TreeEnsemble(TreeEnsemble::from_value(value)?));
        }

        if value.get("coefficients").is_some() {
            let model: LinearModel = serde_json::from_value(value).map_err(|e| {
                ForecastError::load(MODEL_SOURCE, format!("invalid linear model: {}", e))
            })?;
            model.check()?;
            return Ok(ModelArtifact::Linear(model));
        }

        Err(ForecastError::load(
            MODEL_SOURCE,
            "unrecognized model format (expected XGBoost JSON or linear coefficients)",
        ))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::TreeEnsemble(_) => "tree-ensemble",
            ModelArtifact::Linear(_) => "linear",
        }
    }

    pub fn num_features(&self) -> usize {
        self.as_regressor().num_features()
    }

    pub fn as_regressor(&self) -> &dyn Regressor {
        match self {
            ModelArtifact::TreeEnsemble(model) => model,
            ModelArtifact::Linear(model) => model,
        }
    }

    pub fn into_regressor(self) -> Arc<dyn Regressor> {
        match self {
            ModelArtifact::TreeEnsemble(model) => Arc::new(model),
            ModelArtifact::Linear(model) => Arc::new(model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detects_linear_artifact() {
        let artifact =
            ModelArtifact::from_json_str(r#"{"intercept": 1.0, "coefficients": [0.5, 0.5]}"#)
                .unwrap();

        assert_eq!(artifact.kind(), "linear");
        assert_eq!(artifact.num_features(), 2);
        assert_eq!(artifact.into_regressor().predict(&[2.0, 4.0]), 4.0);
    }

    #[test]
    fn test_unknown_format_is_load_error() {
        let result = ModelArtifact::from_json_str(r#"{"weights": []}"#);
        assert!(matches!(result, Err(ForecastError::Load { .. })));

        let result = ModelArtifact::from_json_str("not json");
        assert!(matches!(result, Err(ForecastError::Load { .. })));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"{{"feature_names": ["a"], "intercept": 0.0, "coefficients": [2.0]}}"#
        )?;

        let artifact = ModelArtifact::load(file.path())?;

        assert_eq!(artifact.as_regressor().feature_names(), Some(&["a".to_string()][..]));
        Ok(())
    }
}
