use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ForecastError, Result};
use crate::models::{ColorMetric, DisplayDomain};
use crate::processors::ForecastPipeline;
use crate::readers::DatasetSources;
use crate::utils::constants::{DISPLAY_DOMAIN_MAX, DISPLAY_DOMAIN_MIN, SUMMARY_DECIMALS};

/// Environment variables use this prefix with `__` between path segments,
/// e.g. `NWP_FORECAST__DISPLAY__DOMAIN_MAX=40`
pub const ENV_PREFIX: &str = "NWP_FORECAST";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataSettings {
    pub stations: Option<PathBuf>,
    pub features: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct DisplaySettings {
    pub domain_min: f64,
    pub domain_max: f64,
    #[validate(range(max = 6))]
    pub decimals: u32,
    pub color_metric: ColorMetric,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ProcessingSettings {
    #[validate(range(min = 1, max = 1024))]
    pub max_workers: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[validate(nested)]
    pub display: DisplaySettings,
    #[validate(nested)]
    pub processing: ProcessingSettings,
}

impl Settings {
    /// Layer built-in defaults, an optional config file and environment
    /// variables, in that order
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("display.domain_min", DISPLAY_DOMAIN_MIN)?
            .set_default("display.domain_max", DISPLAY_DOMAIN_MAX)?
            .set_default("display.decimals", i64::from(SUMMARY_DECIMALS))?
            .set_default("display.color_metric", ColorMetric::default().as_str())?
            .set_default("processing.max_workers", num_cpus::get() as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.check()?;
        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.display_domain()?;
        Ok(())
    }

    pub fn display_domain(&self) -> Result<DisplayDomain> {
        DisplayDomain::new(self.display.domain_min, self.display.domain_max)
    }

    /// All three source paths; missing ones are a configuration error
    pub fn sources(&self) -> Result<DatasetSources> {
        let missing: Vec<&str> = [
            ("stations", &self.data.stations),
            ("features", &self.data.features),
            ("model", &self.data.model),
        ]
        .iter()
        .filter(|(_, path)| path.is_none())
        .map(|(name, _)| *name)
        .collect();

        match (&self.data.stations, &self.data.features, &self.data.model) {
            (Some(stations), Some(features), Some(model)) => {
                Ok(DatasetSources::new(stations, features, model))
            }
            _ => Err(ForecastError::Config(format!(
                "Missing data source paths: {} (set them with --stations/--features/--model, \
                 the config file or {}__DATA__*)",
                missing.join(", "),
                ENV_PREFIX
            ))),
        }
    }

    pub fn pipeline(&self) -> Result<ForecastPipeline> {
        Ok(ForecastPipeline::new(self.processing.max_workers)
            .with_decimals(self.display.decimals)
            .with_color_metric(self.display.color_metric)
            .with_display_domain(self.display_domain()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();

        assert_eq!(settings.display_domain().unwrap().as_pair(), [0.0, 38.0]);
        assert_eq!(settings.display.decimals, 1);
        assert_eq!(settings.display.color_metric, ColorMetric::Mean);
        assert!(settings.processing.max_workers >= 1);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[data]\nstations = \"stations.csv\"\nfeatures = \"features.csv\"\nmodel = \"model.json\"\n\
             [display]\ndomain_max = 40.0\ncolor_metric = \"max\"\n\
             [processing]\nmax_workers = 2"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.display.domain_max, 40.0);
        assert_eq!(settings.display.color_metric, ColorMetric::Max);
        assert_eq!(settings.processing.max_workers, 2);
        assert_eq!(
            settings.sources().unwrap(),
            DatasetSources::new("stations.csv", "features.csv", "model.json")
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[display]\ndomain_min = 40.0\ndomain_max = 10.0").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());

        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[processing]\nmax_workers = 0").unwrap();
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_sources_are_named() {
        let settings = Settings::load(None).unwrap();
        let err = settings.sources().unwrap_err().to_string();

        assert!(err.contains("stations"));
        assert!(err.contains("model"));
    }
}
