use crate::cli::args::{Cli, Commands, DataArgs};
use crate::dataset::DatasetStore;
use crate::error::{ForecastError, Result};
use crate::inference::{FeatureProjection, InferenceEngine};
use crate::query::{SelectionEvent, SelectionHandler};
use crate::readers::DatasetLoader;
use crate::settings::Settings;
use crate::utils::constants::{model_features, EXCLUDED_FEATURES};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{GeoJsonWriter, ParquetWriter};
use std::collections::BTreeSet;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.verbose {
        tracing::debug!("Verbose logging enabled");
    }

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Summarize { data } => {
            let loader = build_loader(settings, &data)?;
            let progress = ProgressReporter::new_spinner("Building forecast dataset...", false);
            let store = DatasetStore::open(&loader, Some(&progress)).await?;
            let snapshot = store.current().snapshot;

            println!("\n{}", snapshot.report().generate_summary());
            println!(
                "{:<12} {:<28} {:>9} {:>9} {:>7} {:>7} {:>7} {:>6}",
                "Station", "Name", "Lon", "Lat", "Min", "Mean", "Max", "Count"
            );
            for entry in snapshot.spatial_entries() {
                println!(
                    "{:<12} {:<28} {:>9.4} {:>9.4} {:>7.1} {:>7.1} {:>7.1} {:>6}",
                    entry.station_id,
                    entry.display_name,
                    entry.longitude,
                    entry.latitude,
                    entry.summary.min_predicted,
                    entry.summary.mean_predicted,
                    entry.summary.max_predicted,
                    entry.summary.prediction_count
                );
            }
        }

        Commands::Export {
            data,
            geojson,
            parquet,
            compression,
            pretty,
        } => {
            if geojson.is_none() && parquet.is_none() {
                return Err(ForecastError::Config(
                    "Nothing to export: pass --geojson and/or --parquet".to_string(),
                ));
            }

            // Fail on a bad compression name before doing any work
            let parquet_writer = ParquetWriter::new().with_compression(&compression)?;

            let loader = build_loader(settings, &data)?;
            let progress = ProgressReporter::new_spinner("Building forecast dataset...", false);
            let store = DatasetStore::open(&loader, Some(&progress)).await?;
            let snapshot = store.current().snapshot;
            let entries = snapshot.spatial_entries();

            println!("\n{}", snapshot.report().generate_summary());

            if let Some(path) = geojson {
                GeoJsonWriter::new().pretty(pretty).write_entries(entries, &path)?;
                println!("GeoJSON written to {} ({} features)", path.display(), entries.len());
            }

            if let Some(path) = parquet {
                parquet_writer.write_entries(entries, &path)?;
                let file_info = parquet_writer.get_file_info(&path)?;
                println!("\n{}", file_info.summary());
            }

            println!("Export complete!");
        }

        Commands::Query {
            data,
            station,
            output,
        } => {
            let loader = build_loader(settings, &data)?;
            let progress = ProgressReporter::silent();
            let store = DatasetStore::open(&loader, Some(&progress)).await?;

            let mut handler = SelectionHandler::new();
            let response = handler.handle(&store.current(), Some(SelectionEvent::new(station)));
            let json = serde_json::to_string_pretty(&response)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!("Selection response written to {}", path.display());
                }
                None => println!("{}", json),
            }

            if let Some(warning) = response.warning {
                tracing::warn!("{}", warning);
            }
        }

        Commands::Validate { data } => {
            let loader = build_loader(settings, &data)?;
            let progress = ProgressReporter::new_spinner("Validating sources...", false);
            progress.stage("Reading station registry, feature store and model...");

            let loaded = loader.read_sources().await?;

            let schema: Vec<String> = model_features().into_iter().map(String::from).collect();
            let kind = loaded.artifact.kind();
            let engine = InferenceEngine::new(loaded.artifact.into_regressor(), schema)?;
            let projection =
                FeatureProjection::new(loaded.store.columns(), EXCLUDED_FEATURES, engine.schema())?;

            progress.finish_with_message("Sources loaded");

            let feature_stations: BTreeSet<&str> = loaded
                .store
                .records()
                .iter()
                .map(|r| r.station_id.as_str())
                .collect();
            let without_features: Vec<&str> = loaded
                .registry
                .station_ids()
                .filter(|id| !feature_stations.contains(id))
                .collect();
            let dropped = loaded.store.dropped();

            println!("\n=== Source Validation ===");
            println!("Stations: {}", loaded.registry.len());
            println!(
                "Feature records: {} ({} stations)",
                loaded.store.len(),
                feature_stations.len()
            );
            println!(
                "Dropped rows: {} (timestamp: {}, station id: {}, duplicate: {})",
                dropped.total(),
                dropped.unparsable_timestamp,
                dropped.missing_station_id,
                dropped.duplicate_key
            );
            println!("Model: {} with {} inputs", kind, projection.len());

            if without_features.is_empty() {
                println!("✅ Every registered station has feature records");
            } else {
                println!(
                    "⚠️  {} stations have no feature records: {}",
                    without_features.len(),
                    without_features.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Merge CLI overrides into the loaded settings and build a loader
fn build_loader(mut settings: Settings, data: &DataArgs) -> Result<DatasetLoader> {
    if let Some(ref path) = data.stations {
        settings.data.stations = Some(path.clone());
    }
    if let Some(ref path) = data.features {
        settings.data.features = Some(path.clone());
    }
    if let Some(ref path) = data.model {
        settings.data.model = Some(path.clone());
    }
    if let Some(workers) = data.max_workers {
        settings.processing.max_workers = workers;
    }
    if let Some(ref metric) = data.color_metric {
        settings.display.color_metric = metric.parse()?;
    }
    settings.check()?;

    let sources = settings.sources()?;
    tracing::info!(
        "Sources: stations={}, features={}, model={}",
        sources.stations.display(),
        sources.features.display(),
        sources.model.display()
    );

    Ok(DatasetLoader::new(sources).with_pipeline(settings.pipeline()?))
}
