use crate::error::{ForecastError, Result};
use crate::models::{StationMetadata, StationRegistry};
use crate::readers::column_mapping::{CanonicalColumn, ColumnMapping, ResolvedColumns};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, STATION_SOURCE};
use crate::utils::coordinates::{parse_coordinate, validate_geographic};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [CanonicalColumn; 4] = [
    CanonicalColumn::StationId,
    CanonicalColumn::DisplayName,
    CanonicalColumn::Longitude,
    CanonicalColumn::Latitude,
];

pub struct StationReader {
    mapping: ColumnMapping,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            mapping: ColumnMapping::registry(),
        }
    }

    /// Read the station registry from a CSV file
    pub fn read_registry(&self, path: &Path) -> Result<StationRegistry> {
        let file = File::open(path).map_err(|e| {
            ForecastError::load(
                STATION_SOURCE,
                format!("cannot open {}: {}", path.display(), e),
            )
        })?;
        let registry = self.read_registry_from(file)?;

        tracing::info!(
            "Loaded {} stations from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn read_registry_from<R: Read>(&self, reader: R) -> Result<StationRegistry> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ForecastError::load(STATION_SOURCE, e.to_string()))?
            .clone();
        let columns = self
            .mapping
            .resolve(&headers, &REQUIRED_COLUMNS, STATION_SOURCE)?;

        let mut registry = StationRegistry::new();
        for row in csv_reader.records() {
            let row = row.map_err(|e| ForecastError::load(STATION_SOURCE, e.to_string()))?;

            // Skip blank lines
            if row.iter().all(|field| field.is_empty()) {
                continue;
            }

            let station = self.parse_station_row(&row, &columns)?;
            registry.insert(station)?;
        }

        Ok(registry)
    }

    /// Parse a single registry row
    fn parse_station_row(
        &self,
        row: &StringRecord,
        columns: &ResolvedColumns,
    ) -> Result<StationMetadata> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let field = |column: &CanonicalColumn| {
            columns
                .position(column)
                .and_then(|index| row.get(index))
                .unwrap_or("")
        };

        let station_id = field(&CanonicalColumn::StationId);
        if station_id.is_empty() {
            return Err(ForecastError::load(
                STATION_SOURCE,
                format!("line {}: empty station identifier", line),
            ));
        }

        let coordinate = |column: &CanonicalColumn| {
            parse_coordinate(field(column)).map_err(|e| {
                ForecastError::load(
                    STATION_SOURCE,
                    format!("line {} (station {}): {}", line, station_id, e),
                )
            })
        };
        let longitude = coordinate(&CanonicalColumn::Longitude)?;
        let latitude = coordinate(&CanonicalColumn::Latitude)?;

        validate_geographic(longitude, latitude).map_err(|e| {
            ForecastError::load(
                STATION_SOURCE,
                format!("line {} (station {}): {}", line, station_id, e),
            )
        })?;

        Ok(StationMetadata::new(
            station_id,
            field(&CanonicalColumn::DisplayName),
            longitude,
            latitude,
        ))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
