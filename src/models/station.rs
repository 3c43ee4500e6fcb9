use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub station_id: String,

    pub display_name: String,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
}

impl StationMetadata {
    pub fn new(
        station_id: impl Into<String>,
        display_name: impl Into<String>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            display_name: display_name.into(),
            longitude,
            latitude,
        }
    }
}

/// Immutable station_id -> metadata mapping, ordered by id
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: BTreeMap<String, StationMetadata>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting invalid coordinates and conflicting ids.
    /// Identical repeated entries collapse to one.
    pub fn from_stations(stations: impl IntoIterator<Item = StationMetadata>) -> Result<Self> {
        let mut registry = Self::new();
        for station in stations {
            registry.insert(station)?;
        }
        Ok(registry)
    }

    pub(crate) fn insert(&mut self, station: StationMetadata) -> Result<()> {
        station.validate()?;

        if let Some(existing) = self.stations.get(&station.station_id) {
            if *existing == station {
                return Ok(());
            }
            return Err(ForecastError::load(
                crate::utils::constants::STATION_SOURCE,
                format!(
                    "station {} appears twice with different attributes",
                    station.station_id
                ),
            ));
        }

        self.stations.insert(station.station_id.clone(), station);
        Ok(())
    }

    pub fn get(&self, station_id: &str) -> Option<&StationMetadata> {
        self.stations.get(station_id)
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.stations.contains_key(station_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationMetadata> {
        self.stations.values()
    }

    pub fn station_ids(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationMetadata::new("96745", "Stasiun Meteorologi Kemayoran", 106.84, -6.15);
        assert!(station.validate().is_ok());

        let invalid = StationMetadata::new("96745", "Invalid Station", 106.84, 91.0);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_registry_collapses_identical_duplicates() {
        let station = StationMetadata::new("A", "Sta A", 100.0, -2.0);
        let registry =
            StationRegistry::from_stations(vec![station.clone(), station.clone()]).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A"), Some(&station));
    }

    #[test]
    fn test_registry_rejects_conflicting_duplicates() {
        let result = StationRegistry::from_stations(vec![
            StationMetadata::new("A", "Sta A", 100.0, -2.0),
            StationMetadata::new("A", "Sta A", 101.0, -2.0),
        ]);

        assert!(matches!(result, Err(ForecastError::Load { .. })));
    }

    #[test]
    fn test_registry_iterates_in_id_order() {
        let registry = StationRegistry::from_stations(vec![
            StationMetadata::new("C", "Sta C", 110.0, -7.0),
            StationMetadata::new("A", "Sta A", 100.0, -2.0),
            StationMetadata::new("B", "Sta B", 105.0, -5.0),
        ])
        .unwrap();

        let ids: Vec<&str> = registry.station_ids().collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }
}
