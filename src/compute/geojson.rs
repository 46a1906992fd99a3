//! GeoJSON conversion for region query results.
//!
//! The heat overlay renderer consumes a `FeatureCollection` of bare points.

use geojson::{Feature, FeatureCollection, Geometry, Value};
use incidex_types::LatLon;

/// Converts a coordinate pair to a GeoJSON point geometry (`[lon, lat]`).
pub fn lat_lon_to_geometry(coord: &LatLon) -> Geometry {
    Geometry::new(Value::Point(vec![coord.lon, coord.lat]))
}

/// Wraps region query results in a `FeatureCollection`, one feature per point.
///
/// # Examples
///
/// ```
/// use incidex::compute::geojson::points_to_feature_collection;
/// use incidex_types::LatLon;
///
/// let fc = points_to_feature_collection(&[LatLon::new(37.77, -122.41)]);
/// assert_eq!(fc.features.len(), 1);
/// assert!(serde_json::to_string(&fc).unwrap().contains("-122.41"));
/// ```
pub fn points_to_feature_collection(points: &[LatLon]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: points
            .iter()
            .map(|p| Feature::from(lat_lon_to_geometry(p)))
            .collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_axis_order() {
        let geom = lat_lon_to_geometry(&LatLon::new(10.0, 20.0));
        match geom.value {
            Value::Point(coords) => assert_eq!(coords, vec![20.0, 10.0]),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_collection_serializes() {
        let fc = points_to_feature_collection(&[LatLon::new(1.0, 2.0), LatLon::new(3.0, 4.0)]);
        let json: serde_json::Value = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
        assert_eq!(json["features"][1]["geometry"]["coordinates"][0], 4.0);
    }

    #[test]
    fn test_empty_collection() {
        assert!(points_to_feature_collection(&[]).features.is_empty());
    }
}
