use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load {source_name}: {message}")]
    Load {
        source_name: String,
        message: String,
    },

    #[error("Schema mismatch in {source_name}: missing required columns [{}]", .missing.join(", "))]
    SchemaMismatch {
        source_name: String,
        missing: Vec<String>,
    },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Station {station_id} not found in the published summaries")]
    SelectionNotFound { station_id: String },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ForecastError {
    pub fn load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ForecastError::Load {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ForecastError::Inference {
            message: message.into(),
        }
    }
}
