use std::sync::{Arc, PoisonError, RwLock};

use crate::dataset::DatasetSnapshot;
use crate::error::Result;
use crate::readers::DatasetLoader;
use crate::utils::progress::ProgressReporter;

/// A published snapshot together with the generation it was published as
#[derive(Debug, Clone)]
pub struct PublishedDataset {
    pub generation: u64,
    pub snapshot: Arc<DatasetSnapshot>,
}

/// Holds the currently published dataset. Reloads build a new snapshot off
/// to the side and swap it in under a short write lock.
#[derive(Debug)]
pub struct DatasetStore {
    current: RwLock<PublishedDataset>,
}

impl DatasetStore {
    pub fn new(snapshot: DatasetSnapshot) -> Self {
        Self {
            current: RwLock::new(PublishedDataset {
                generation: 1,
                snapshot: Arc::new(snapshot),
            }),
        }
    }

    /// Load the initial dataset; nothing is published if any source fails
    pub async fn open(loader: &DatasetLoader, progress: Option<&ProgressReporter>) -> Result<Self> {
        let snapshot = loader.load(progress).await?;
        Ok(Self::new(snapshot))
    }

    pub fn current(&self) -> PublishedDataset {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Swap in a fully built snapshot and return its generation
    pub fn publish(&self, snapshot: DatasetSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.generation += 1;
        current.snapshot = snapshot;

        tracing::info!("Published dataset generation {}", current.generation);
        current.generation
    }

    /// Rebuild from the loader's sources. On failure the previous snapshot
    /// stays published.
    pub async fn reload(&self, loader: &DatasetLoader) -> Result<u64> {
        match loader.load(None).await {
            Ok(snapshot) => Ok(self.publish(snapshot)),
            Err(e) => {
                tracing::warn!(
                    "Reload failed, keeping generation {}: {}",
                    self.generation(),
                    e
                );
                Err(e)
            }
        }
    }
}
