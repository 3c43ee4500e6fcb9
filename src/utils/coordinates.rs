use crate::error::{ForecastError, Result};

/// Parse a coordinate given in decimal degrees
///
/// # Examples
/// ```
/// use nwp_station_forecast::utils::parse_coordinate;
///
/// let longitude = parse_coordinate(" 106.84 ").unwrap();
/// assert!((longitude - 106.84).abs() < 0.000001);
/// ```
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let value = coord_str.trim().parse::<f64>().map_err(|_| {
        ForecastError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
    })?;

    if !value.is_finite() {
        return Err(ForecastError::InvalidCoordinate(format!(
            "Coordinate is not finite: '{}'",
            coord_str
        )));
    }

    Ok(value)
}

/// Validate a longitude/latitude pair against the geographic ranges
pub fn validate_geographic(longitude: f64, latitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ForecastError::InvalidCoordinate(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ForecastError::InvalidCoordinate(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}
