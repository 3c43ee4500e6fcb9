use crate::error::{ForecastError, Result};
use crate::utils::constants::{
    DISPLAY_NAME_ALIASES, FEATURE_COLUMNS, LATITUDE_ALIASES, LONGITUDE_ALIASES,
    STATION_ID_ALIASES, TIMESTAMP_ALIASES,
};
use csv::StringRecord;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalColumn {
    StationId,
    DisplayName,
    Longitude,
    Latitude,
    Timestamp,
    Feature(String),
}

impl CanonicalColumn {
    pub fn feature(name: impl Into<String>) -> Self {
        CanonicalColumn::Feature(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            CanonicalColumn::StationId => "station_id",
            CanonicalColumn::DisplayName => "display_name",
            CanonicalColumn::Longitude => "longitude",
            CanonicalColumn::Latitude => "latitude",
            CanonicalColumn::Timestamp => "timestamp",
            CanonicalColumn::Feature(name) => name,
        }
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Declared raw header -> canonical column table
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    entries: Vec<(String, CanonicalColumn)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_alias(mut self, raw: &str, canonical: CanonicalColumn) -> Self {
        self.entries.push((raw.to_string(), canonical));
        self
    }

    fn with_aliases(self, aliases: &[&str], canonical: CanonicalColumn) -> Self {
        aliases
            .iter()
            .fold(self, |mapping, raw| mapping.with_alias(raw, canonical.clone()))
    }

    /// Mapping for the station metadata source
    pub fn registry() -> Self {
        Self::new()
            .with_aliases(STATION_ID_ALIASES, CanonicalColumn::StationId)
            .with_aliases(DISPLAY_NAME_ALIASES, CanonicalColumn::DisplayName)
            .with_aliases(LONGITUDE_ALIASES, CanonicalColumn::Longitude)
            .with_aliases(LATITUDE_ALIASES, CanonicalColumn::Latitude)
    }

    /// Mapping for the NWP feature source. Canonical feature names are
    /// accepted as raw names too, so pre-renamed exports load unchanged.
    pub fn feature_store() -> Self {
        let mut mapping = Self::new()
            .with_aliases(STATION_ID_ALIASES, CanonicalColumn::StationId)
            .with_aliases(TIMESTAMP_ALIASES, CanonicalColumn::Timestamp)
            .with_aliases(LONGITUDE_ALIASES, CanonicalColumn::Longitude)
            .with_aliases(LATITUDE_ALIASES, CanonicalColumn::Latitude);

        for (raw, canonical) in FEATURE_COLUMNS {
            mapping = mapping.with_alias(raw, CanonicalColumn::feature(*canonical));
            if raw != canonical {
                mapping = mapping.with_alias(canonical, CanonicalColumn::feature(*canonical));
            }
        }

        mapping
    }

    pub fn canonical_for(&self, raw: &str) -> Option<&CanonicalColumn> {
        let raw = raw.trim();
        self.entries
            .iter()
            .find(|(alias, _)| alias == raw)
            .map(|(_, canonical)| canonical)
    }

    /// Resolve a header row, failing with the full list of missing required
    /// columns
    pub fn resolve(
        &self,
        headers: &StringRecord,
        required: &[CanonicalColumn],
        source_name: &str,
    ) -> Result<ResolvedColumns> {
        let mut positions = HashMap::new();
        let mut order = Vec::new();
        let mut ignored = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            match self.canonical_for(header) {
                Some(canonical) if positions.contains_key(canonical) => {
                    tracing::warn!(
                        "{}: column '{}' duplicates {}, keeping the first occurrence",
                        source_name,
                        header,
                        canonical
                    );
                    ignored.push(header.to_string());
                }
                Some(canonical) => {
                    positions.insert(canonical.clone(), index);
                    order.push(canonical.clone());
                }
                None => ignored.push(header.to_string()),
            }
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|column| !positions.contains_key(*column))
            .map(|column| column.name().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ForecastError::SchemaMismatch {
                source_name: source_name.to_string(),
                missing,
            });
        }

        if !ignored.is_empty() {
            tracing::debug!("{}: ignoring unmapped columns {:?}", source_name, ignored);
        }

        Ok(ResolvedColumns {
            positions,
            order,
            ignored,
        })
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new()
    }
}

/// Header positions of the canonical columns found in one source
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    positions: HashMap<CanonicalColumn, usize>,
    order: Vec<CanonicalColumn>,
    ignored: Vec<String>,
}

impl ResolvedColumns {
    pub fn position(&self, column: &CanonicalColumn) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Feature columns in header order, with their positions
    pub fn feature_columns(&self) -> Vec<(String, usize)> {
        self.order
            .iter()
            .filter_map(|column| match column {
                CanonicalColumn::Feature(name) => {
                    self.positions.get(column).map(|index| (name.clone(), *index))
                }
                _ => None,
            })
            .collect()
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }
}
