use crate::bbox::BoundingBox;
use crate::point::LatLon;
use geo::{Line, coord};
use serde::{Deserialize, Serialize};

/// A two-point travel leg used as the subject of a proximity query.
///
/// Segments are transient: they are built per query and never stored.
/// Origin and destination may coincide, in which case the segment behaves
/// like a single point.
///
/// # Examples
///
/// ```
/// use incidex_types::{LatLon, Segment};
///
/// let leg = Segment::from_coords(0.0, 0.0, 0.0, 10.0);
/// assert_eq!(leg.origin(), LatLon::new(0.0, 0.0));
/// assert_eq!(leg.destination(), LatLon::new(0.0, 10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    line: Line<f64>,
}

impl Segment {
    pub fn new(origin: LatLon, destination: LatLon) -> Self {
        Self {
            line: Line::new(
                coord! { x: origin.lon, y: origin.lat },
                coord! { x: destination.lon, y: destination.lat },
            ),
        }
    }

    /// Build a segment from raw coordinates, latitude first for each endpoint.
    pub fn from_coords(origin_lat: f64, origin_lon: f64, dest_lat: f64, dest_lon: f64) -> Self {
        Self::new(
            LatLon::new(origin_lat, origin_lon),
            LatLon::new(dest_lat, dest_lon),
        )
    }

    pub fn origin(&self) -> LatLon {
        LatLon::new(self.line.start.y, self.line.start.x)
    }

    pub fn destination(&self) -> LatLon {
        LatLon::new(self.line.end.y, self.line.end.x)
    }

    /// The underlying `geo::Line` (`x` = longitude, `y` = latitude).
    pub fn line(&self) -> &Line<f64> {
        &self.line
    }

    /// True when origin and destination are the same location.
    pub fn is_degenerate(&self) -> bool {
        self.line.start == self.line.end
    }

    /// Latitude halfway between the endpoints.
    pub fn mid_lat(&self) -> f64 {
        (self.line.start.y + self.line.end.y) / 2.0
    }

    /// Smallest box containing both endpoints.
    pub fn envelope(&self) -> BoundingBox {
        let (a, b) = (self.line.start, self.line.end);
        BoundingBox::new(a.y.max(b.y), a.y.min(b.y), a.x.max(b.x), a.x.min(b.x))
    }
}
