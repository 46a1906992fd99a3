use geo::Point;
use serde::{Deserialize, Serialize};

/// Stable identifier of a stored point. Assigned on insertion, never reused.
pub type PointId = u64;

/// A bare latitude/longitude pair in degrees.
///
/// This is the shape query results are returned in, so callers never depend
/// on internal point ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to a `geo::Point` (`x` = longitude, `y` = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<(f64, f64)> for LatLon {
    /// Builds a pair from a `(lat, lon)` tuple.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for (f64, f64) {
    fn from(value: LatLon) -> Self {
        (value.lat, value.lon)
    }
}

/// A stored incident location.
///
/// Points are immutable once created; the only way to obtain one with a real
/// id is through the point store.
///
/// # Examples
///
/// ```
/// use incidex_types::GeoPoint;
///
/// let p = GeoPoint::new(7, 37.7749, -122.4194);
/// assert_eq!(p.id(), 7);
/// assert_eq!(p.lat(), 37.7749);
/// assert_eq!(p.lon(), -122.4194);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    id: PointId,
    point: Point<f64>,
}

impl GeoPoint {
    pub fn new(id: PointId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            point: Point::new(lon, lat),
        }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    /// Get a reference to the underlying `geo::Point`.
    pub fn point(&self) -> &Point<f64> {
        &self.point
    }

    /// Drop the id, keeping only the coordinates.
    pub fn lat_lon(&self) -> LatLon {
        LatLon::new(self.lat(), self.lon())
    }
}
