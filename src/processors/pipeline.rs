use crate::dataset::DatasetSnapshot;
use crate::error::{ForecastError, Result};
use crate::inference::{FeatureProjection, InferenceEngine};
use crate::models::{ColorMetric, DisplayDomain, DropCounts, FeatureStore, StationRegistry};
use crate::processors::spatial_builder::JoinReport;
use crate::processors::{PredictionAggregator, SpatialBuilder};
use crate::utils::constants::{EXCLUDED_FEATURES, SUMMARY_DECIMALS};
use crate::utils::progress::ProgressReporter;
use serde::Serialize;

/// Runs inference, aggregation and the spatial join over one loaded dataset
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    max_workers: usize,
    decimals: u32,
    color_metric: ColorMetric,
    display_domain: DisplayDomain,
    excluded_features: Vec<String>,
}

impl ForecastPipeline {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            decimals: SUMMARY_DECIMALS,
            color_metric: ColorMetric::default(),
            display_domain: DisplayDomain::default(),
            excluded_features: EXCLUDED_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_color_metric(mut self, color_metric: ColorMetric) -> Self {
        self.color_metric = color_metric;
        self
    }

    pub fn with_display_domain(mut self, display_domain: DisplayDomain) -> Self {
        self.display_domain = display_domain;
        self
    }

    pub fn display_domain(&self) -> DisplayDomain {
        self.display_domain
    }

    /// Build a complete snapshot from loaded sources. Nothing is published
    /// here; the caller decides when to swap it in.
    pub fn run(
        &self,
        registry: StationRegistry,
        store: FeatureStore,
        engine: &InferenceEngine,
        progress: Option<&ProgressReporter>,
    ) -> Result<DatasetSnapshot> {
        let excluded: Vec<&str> = self.excluded_features.iter().map(String::as_str).collect();
        let projection = FeatureProjection::new(store.columns(), &excluded, engine.schema())?;

        if let Some(p) = progress {
            p.stage(&format!("Running inference on {} records...", store.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ForecastError::Config(e.to_string()))?;
        let outcome = pool.install(|| engine.predict_records(&projection, store.records()));

        tracing::info!(
            "Inference produced {} predictions ({} records skipped)",
            outcome.predictions.len(),
            outcome.skipped
        );

        if let Some(p) = progress {
            p.stage("Aggregating station summaries...");
        }

        let summaries = PredictionAggregator::with_decimals(self.decimals).aggregate(&outcome.predictions);

        if let Some(p) = progress {
            p.stage("Building spatial dataset...");
        }

        let builder = SpatialBuilder::with_color_metric(self.color_metric);
        let spatial = builder.build(&registry, &summaries);
        let join = builder.join_report(&registry, &summaries);

        if !join.stations_without_summary.is_empty() {
            tracing::warn!(
                "{} stations have no successful prediction and are hidden from the map: {:?}",
                join.stations_without_summary.len(),
                join.stations_without_summary
            );
        }
        if !join.summaries_without_station.is_empty() {
            tracing::warn!(
                "{} stations have predictions but no registry entry: {:?}",
                join.summaries_without_station.len(),
                join.summaries_without_station
            );
        }

        let report = PipelineReport {
            stations_loaded: registry.len(),
            records_loaded: store.len(),
            dropped: store.dropped(),
            skipped_records: outcome.skipped,
            predictions: outcome.predictions.len(),
            summaries: summaries.len(),
            spatial_entries: spatial.len(),
            out_of_domain_predictions: outcome
                .predictions
                .iter()
                .filter(|p| !self.display_domain.contains(p.predicted_value))
                .count(),
            join,
        };

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Built {} map entries from {} predictions",
                report.spatial_entries, report.predictions
            ));
        }

        Ok(DatasetSnapshot::new(
            registry,
            store.into_records(),
            outcome.predictions,
            summaries,
            spatial,
            report,
            self.display_domain,
        ))
    }
}

impl Default for ForecastPipeline {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

/// Counts collected while building a snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub stations_loaded: usize,
    pub records_loaded: usize,
    pub dropped: DropCounts,
    pub skipped_records: usize,
    pub predictions: usize,
    pub summaries: usize,
    pub spatial_entries: usize,
    pub out_of_domain_predictions: usize,
    pub join: JoinReport,
}

impl PipelineReport {
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Forecast Pipeline Report ===\n");
        summary.push_str(&format!("Stations Loaded: {}\n", self.stations_loaded));
        summary.push_str(&format!("Feature Records: {}\n", self.records_loaded));
        summary.push_str(&format!(
            "Dropped Rows: {} (timestamp: {}, station id: {}, duplicate: {})\n",
            self.dropped.total(),
            self.dropped.unparsable_timestamp,
            self.dropped.missing_station_id,
            self.dropped.duplicate_key
        ));
        summary.push_str(&format!(
            "Predictions: {} ({} records skipped)\n",
            self.predictions, self.skipped_records
        ));
        summary.push_str(&format!("Station Summaries: {}\n", self.summaries));
        summary.push_str(&format!("Map Entries: {}\n", self.spatial_entries));

        if self.out_of_domain_predictions > 0 {
            summary.push_str(&format!(
                "Predictions Outside Display Domain: {}\n",
                self.out_of_domain_predictions
            ));
        }

        if !self.join.stations_without_summary.is_empty() {
            summary.push_str(&format!(
                "\nStations Without Predictions: {}\n",
                self.join.stations_without_summary.join(", ")
            ));
        }
        if !self.join.summaries_without_station.is_empty() {
            summary.push_str(&format!(
                "Predictions Without Station Metadata: {}\n",
                self.join.summaries_without_station.join(", ")
            ));
        }

        summary
    }
}
