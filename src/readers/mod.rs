pub mod column_mapping;
pub mod dataset_loader;
pub mod feature_reader;
pub mod station_reader;

pub use column_mapping::{CanonicalColumn, ColumnMapping, ResolvedColumns};
pub use dataset_loader::{DatasetLoader, DatasetSources, LoadedSources};
pub use feature_reader::{parse_timestamp, FeatureReader};
pub use station_reader::StationReader;
