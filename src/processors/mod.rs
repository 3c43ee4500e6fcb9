pub mod pipeline;
pub mod prediction_aggregator;
pub mod spatial_builder;

pub use pipeline::{ForecastPipeline, PipelineReport};
pub use prediction_aggregator::PredictionAggregator;
pub use spatial_builder::{JoinReport, SpatialBuilder};
