use crate::error::{ForecastError, Result};
use crate::models::{ColorMetric, SpatialEntry, StationSummary};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{Array, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Writes the per-station summary table (one row per map entry)
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ForecastError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write map entries to a Parquet file. An empty slice still produces a
    /// valid file with the summary schema.
    pub fn write_entries(&self, entries: &[SpatialEntry], path: &Path) -> Result<()> {
        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in entries.chunks(self.row_group_size) {
            let batch = Self::entries_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        tracing::info!("Wrote {} station summaries to {}", entries.len(), path.display());
        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("station_id", DataType::Utf8, false),
            Field::new("display_name", DataType::Utf8, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("min_predicted", DataType::Float64, false),
            Field::new("mean_predicted", DataType::Float64, false),
            Field::new("max_predicted", DataType::Float64, false),
            Field::new("prediction_count", DataType::UInt64, false),
        ]))
    }

    fn entries_to_batch(entries: &[SpatialEntry], schema: Arc<Schema>) -> Result<RecordBatch> {
        let station_ids: Vec<&str> = entries.iter().map(|e| e.station_id.as_str()).collect();
        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        let longitudes: Vec<f64> = entries.iter().map(|e| e.longitude).collect();
        let latitudes: Vec<f64> = entries.iter().map(|e| e.latitude).collect();
        let mins: Vec<f64> = entries.iter().map(|e| e.summary.min_predicted).collect();
        let means: Vec<f64> = entries.iter().map(|e| e.summary.mean_predicted).collect();
        let maxs: Vec<f64> = entries.iter().map(|e| e.summary.max_predicted).collect();
        let counts: Vec<u64> = entries
            .iter()
            .map(|e| e.summary.prediction_count as u64)
            .collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(station_ids)),
                Arc::new(StringArray::from(names)),
                Arc::new(Float64Array::from(longitudes)),
                Arc::new(Float64Array::from(latitudes)),
                Arc::new(Float64Array::from(mins)),
                Arc::new(Float64Array::from(means)),
                Arc::new(Float64Array::from(maxs)),
                Arc::new(UInt64Array::from(counts)),
            ],
        )?;

        Ok(batch)
    }

    /// Read a summary table back. `color_metric` is recomputed from the
    /// stored statistics.
    pub fn read_entries(&self, path: &Path, color_metric: ColorMetric) -> Result<Vec<SpatialEntry>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut entries = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;

            let station_ids = string_column(&batch, 0, "station_id")?;
            let names = string_column(&batch, 1, "display_name")?;
            let longitudes = float_column(&batch, 2, "longitude")?;
            let latitudes = float_column(&batch, 3, "latitude")?;
            let mins = float_column(&batch, 4, "min_predicted")?;
            let means = float_column(&batch, 5, "mean_predicted")?;
            let maxs = float_column(&batch, 6, "max_predicted")?;
            let counts = batch
                .column(7)
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| {
                    ForecastError::InvalidFormat("Invalid prediction_count column type".to_string())
                })?;

            for i in 0..batch.num_rows() {
                let summary = StationSummary {
                    station_id: station_ids.value(i).to_string(),
                    min_predicted: mins.value(i),
                    mean_predicted: means.value(i),
                    max_predicted: maxs.value(i),
                    prediction_count: counts.value(i) as usize,
                };
                entries.push(SpatialEntry {
                    station_id: summary.station_id.clone(),
                    display_name: names.value(i).to_string(),
                    longitude: longitudes.value(i),
                    latitude: latitudes.value(i),
                    color_metric: color_metric.select(&summary),
                    summary,
                });
            }
        }

        Ok(entries)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn string_column<'a>(batch: &'a RecordBatch, index: usize, name: &str) -> Result<&'a StringArray> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ForecastError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn float_column<'a>(batch: &'a RecordBatch, index: usize, name: &str) -> Result<&'a Float64Array> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ForecastError::InvalidFormat(format!("Invalid {} column type", name)))
}

#[derive(Debug, Clone)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: usize,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationMetadata;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn entry(id: &str, min: f64, mean: f64, max: f64) -> SpatialEntry {
        let station = StationMetadata::new(id, format!("Sta {}", id), 100.0, -2.0);
        let summary = StationSummary {
            station_id: id.to_string(),
            min_predicted: min,
            mean_predicted: mean,
            max_predicted: max,
            prediction_count: 2,
        };
        SpatialEntry::from_join(&station, &summary, ColorMetric::Mean)
    }

    #[test]
    fn test_write_empty_entries() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        writer.write_entries(&[], temp_file.path())?;

        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);
        Ok(())
    }

    #[test]
    fn test_entries_read_back() -> Result<()> {
        let writer = ParquetWriter::new().with_row_group_size(1);
        let temp_file = NamedTempFile::new().unwrap();
        let entries = vec![entry("96001", 15.2, 16.0, 16.8), entry("96002", 20.0, 21.5, 23.0)];

        writer.write_entries(&entries, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert_eq!(info.row_groups, 2);
        assert_eq!(writer.read_entries(temp_file.path(), ColorMetric::Mean)?, entries);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new().unwrap();

            let result = writer.write_entries(&[entry("96001", 1.0, 2.0, 3.0)], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-max").is_err());
        Ok(())
    }
}
