use crate::dataset::DatasetSnapshot;
use crate::error::Result;
use crate::inference::{InferenceEngine, ModelArtifact};
use crate::models::{FeatureStore, StationRegistry};
use crate::processors::ForecastPipeline;
use crate::readers::{FeatureReader, StationReader};
use crate::utils::constants::model_features;
use crate::utils::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Locations of the three inputs a dataset is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSources {
    pub stations: PathBuf,
    pub features: PathBuf,
    pub model: PathBuf,
}

impl DatasetSources {
    pub fn new(
        stations: impl Into<PathBuf>,
        features: impl Into<PathBuf>,
        model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stations: stations.into(),
            features: features.into(),
            model: model.into(),
        }
    }
}

/// Raw inputs read from disk, before inference
#[derive(Debug)]
pub struct LoadedSources {
    pub registry: StationRegistry,
    pub store: FeatureStore,
    pub artifact: ModelArtifact,
}

/// Reads all sources concurrently and runs the pipeline off the async runtime
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    sources: DatasetSources,
    pipeline: ForecastPipeline,
}

impl DatasetLoader {
    pub fn new(sources: DatasetSources) -> Self {
        Self {
            sources,
            pipeline: ForecastPipeline::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ForecastPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn sources(&self) -> &DatasetSources {
        &self.sources
    }

    /// Read the registry, feature store and model artifact concurrently.
    /// Any failing source fails the whole load.
    pub async fn read_sources(&self) -> Result<LoadedSources> {
        let stations_path = self.sources.stations.clone();
        let features_path = self.sources.features.clone();
        let model_path = self.sources.model.clone();

        let stations_handle: JoinHandle<Result<StationRegistry>> =
            tokio::task::spawn_blocking(move || StationReader::new().read_registry(&stations_path));

        let features_handle: JoinHandle<Result<FeatureStore>> =
            tokio::task::spawn_blocking(move || FeatureReader::new().read_store(&features_path));

        let model_handle: JoinHandle<Result<ModelArtifact>> =
            tokio::task::spawn_blocking(move || ModelArtifact::load(&model_path));

        let (registry, store, artifact) =
            tokio::try_join!(stations_handle, features_handle, model_handle)?;

        Ok(LoadedSources {
            registry: registry?,
            store: store?,
            artifact: artifact?,
        })
    }

    /// Build a fresh snapshot from the configured sources
    pub async fn load(&self, progress: Option<&ProgressReporter>) -> Result<DatasetSnapshot> {
        if let Some(p) = progress {
            p.stage("Reading station registry, feature store and model...");
        }

        let loaded = self.read_sources().await?;
        let schema: Vec<String> = model_features().into_iter().map(String::from).collect();
        let engine = InferenceEngine::new(loaded.artifact.into_regressor(), schema)?;

        if let Some(p) = progress {
            p.stage(&format!(
                "Running forecast pipeline over {} records...",
                loaded.store.len()
            ));
        }

        let pipeline = self.pipeline.clone();
        let registry = loaded.registry;
        let store = loaded.store;
        let snapshot =
            tokio::task::spawn_blocking(move || pipeline.run(registry, store, &engine, None))
                .await??;

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Loaded {} stations, {} map entries",
                snapshot.registry().len(),
                snapshot.spatial_entries().len()
            ));
        }

        Ok(snapshot)
    }
}
