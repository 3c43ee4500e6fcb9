use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nwp-forecast")]
#[command(about = "Station temperature forecasts from NWP features")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Settings file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

/// Source paths and processing overrides shared by every subcommand.
/// Anything left unset falls back to the settings file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(long, help = "Station registry CSV")]
    pub stations: Option<PathBuf>,

    #[arg(long, help = "NWP feature CSV")]
    pub features: Option<PathBuf>,

    #[arg(long, help = "Model artifact (XGBoost JSON or linear coefficients)")]
    pub model: Option<PathBuf>,

    #[arg(long)]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Statistic used to color map markers: min, mean or max")]
    pub color_metric: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline and print the report and per-station summaries
    Summarize {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Write the map dataset as GeoJSON and/or a Parquet summary table
    Export {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, help = "GeoJSON FeatureCollection output path")]
        geojson: Option<PathBuf>,

        #[arg(long, help = "Parquet summary table output path")]
        parquet: Option<PathBuf>,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Select a station and print the chart and range-control payload as JSON
    Query {
        #[command(flatten)]
        data: DataArgs,

        #[arg(short, long)]
        station: String,

        #[arg(short, long, help = "Write the JSON response to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Check that the sources load and match the model schema, without inference
    Validate {
        #[command(flatten)]
        data: DataArgs,
    },
}
