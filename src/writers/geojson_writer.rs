use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::SpatialEntry;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: StationProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationProperties {
    pub station_id: String,
    pub display_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub color_metric: f64,
    pub min_predicted: f64,
    pub mean_predicted: f64,
    pub max_predicted: f64,
}

impl From<&SpatialEntry> for Feature {
    fn from(entry: &SpatialEntry) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [entry.longitude, entry.latitude],
            },
            properties: StationProperties {
                station_id: entry.station_id.clone(),
                display_name: entry.display_name.clone(),
                longitude: entry.longitude,
                latitude: entry.latitude,
                color_metric: entry.color_metric,
                min_predicted: entry.summary.min_predicted,
                mean_predicted: entry.summary.mean_predicted,
                max_predicted: entry.summary.max_predicted,
            },
        }
    }
}

impl FeatureCollection {
    pub fn from_entries(entries: &[SpatialEntry]) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: entries.iter().map(Feature::from).collect(),
        }
    }
}

/// Serializes map entries as a GeoJSON `FeatureCollection` of points
pub struct GeoJsonWriter {
    pretty: bool,
}

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn to_json(&self, entries: &[SpatialEntry]) -> Result<String> {
        let collection = FeatureCollection::from_entries(entries);
        let json = if self.pretty {
            serde_json::to_string_pretty(&collection)?
        } else {
            serde_json::to_string(&collection)?
        };
        Ok(json)
    }

    pub fn write_entries(&self, entries: &[SpatialEntry], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let collection = FeatureCollection::from_entries(entries);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &collection)?;
        } else {
            serde_json::to_writer(&mut writer, &collection)?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} map features to {}", entries.len(), path.display());
        Ok(())
    }
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new()
    }
}
