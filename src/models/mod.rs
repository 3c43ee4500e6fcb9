pub mod feature;
pub mod prediction;
pub mod series;
pub mod spatial;
pub mod station;

pub use feature::{DropCounts, FeatureRecord, FeatureStore, FeatureVector, FieldValue};
pub use prediction::{Prediction, StationSummary};
pub use series::{DisplayDomain, SeriesPoint, TimeSeriesPayload};
pub use spatial::{ColorMetric, SpatialEntry};
pub use station::{StationMetadata, StationRegistry};
