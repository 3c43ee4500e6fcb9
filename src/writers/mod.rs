pub mod geojson_writer;
pub mod parquet_writer;

pub use geojson_writer::{FeatureCollection, GeoJsonWriter};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
