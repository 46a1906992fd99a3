//! Validation for coordinates and query inputs.

use crate::error::{IncidexError, Result};
use incidex_types::{BoundingBox, LatLon, Segment};

/// Validates a latitude/longitude pair.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use incidex::compute::validation::validate_coordinate;
///
/// // Valid point
/// assert!(validate_coordinate(37.7749, -122.4194).is_ok());
///
/// // Invalid longitude
/// assert!(validate_coordinate(40.0, 200.0).is_err());
///
/// // Invalid latitude
/// assert!(validate_coordinate(95.0, -74.0).is_err());
/// ```
pub fn validate_coordinate(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() {
        return Err(IncidexError::invalid_coordinate(
            lat,
            lon,
            format!("latitude must be finite, got: {}", lat),
        ));
    }

    if !lon.is_finite() {
        return Err(IncidexError::invalid_coordinate(
            lat,
            lon,
            format!("longitude must be finite, got: {}", lon),
        ));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(IncidexError::invalid_coordinate(
            lat,
            lon,
            format!("latitude out of range [-90.0, 90.0]: {}", lat),
        ));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(IncidexError::invalid_coordinate(
            lat,
            lon,
            format!("longitude out of range [-180.0, 180.0]: {}", lon),
        ));
    }

    Ok(())
}

pub fn validate_lat_lon(coord: &LatLon) -> Result<()> {
    validate_coordinate(coord.lat, coord.lon)
}

/// Validates both endpoints of a segment.
pub fn validate_segment(segment: &Segment) -> Result<()> {
    validate_lat_lon(&segment.origin())?;
    validate_lat_lon(&segment.destination())
}

/// Validates region query bounds.
///
/// Bounds must be finite and `max >= min` on both axes. Bounds past the poles
/// or the antimeridian are accepted; nothing is stored out there.
///
/// # Examples
///
/// ```
/// use incidex::compute::validation::validate_bounding_box;
/// use incidex_types::BoundingBox;
///
/// assert!(validate_bounding_box(&BoundingBox::new(25.0, 5.0, 25.0, 5.0)).is_ok());
///
/// // max_lat < min_lat
/// assert!(validate_bounding_box(&BoundingBox::new(5.0, 25.0, 25.0, 5.0)).is_err());
/// ```
pub fn validate_bounding_box(bbox: &BoundingBox) -> Result<()> {
    if bbox.is_well_formed() {
        return Ok(());
    }

    let bounds = [
        ("max_lat", bbox.max_lat),
        ("min_lat", bbox.min_lat),
        ("max_lon", bbox.max_lon),
        ("min_lon", bbox.min_lon),
    ];
    if let Some((name, value)) = bounds.into_iter().find(|(_, v)| !v.is_finite()) {
        return Err(IncidexError::InvalidBoundingBox(format!(
            "{} must be finite, got: {}",
            name, value
        )));
    }

    if bbox.max_lat < bbox.min_lat {
        return Err(IncidexError::InvalidBoundingBox(format!(
            "max_lat ({}) must be >= min_lat ({})",
            bbox.max_lat, bbox.min_lat
        )));
    }

    Err(IncidexError::InvalidBoundingBox(format!(
        "max_lon ({}) must be >= min_lon ({})",
        bbox.max_lon, bbox.min_lon
    )))
}

/// Validates a proximity threshold: finite and non-negative.
pub fn validate_distance(distance: f64) -> Result<()> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(IncidexError::InvalidDistance(distance));
    }
    Ok(())
}
