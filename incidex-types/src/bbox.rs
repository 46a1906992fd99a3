use serde::{Deserialize, Serialize};

/// Axis-aligned latitude/longitude rectangle used by region queries.
///
/// Field order follows the host API: `(max_lat, min_lat, max_lon, min_lon)`.
/// The constructor does not validate; a box with inverted bounds is a caller
/// error reported by the query that receives it. Containment is closed on
/// every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_lat: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub min_lon: f64,
}

impl BoundingBox {
    pub fn new(max_lat: f64, min_lat: f64, max_lon: f64, min_lon: f64) -> Self {
        Self {
            max_lat,
            min_lat,
            max_lon,
            min_lon,
        }
    }

    /// True when every bound is finite and neither axis is inverted.
    pub fn is_well_formed(&self) -> bool {
        [self.max_lat, self.min_lat, self.max_lon, self.min_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.max_lat >= self.min_lat
            && self.max_lon >= self.min_lon
    }

    /// Closed-interval containment test.
    ///
    /// # Examples
    ///
    /// ```
    /// use incidex_types::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(25.0, 5.0, 25.0, 5.0);
    /// assert!(bbox.contains(10.0, 10.0));
    /// assert!(bbox.contains(25.0, 5.0)); // edges are inside
    /// assert!(!bbox.contains(30.0, 30.0));
    /// ```
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Grow the box by `lat_pad` degrees north/south and `lon_pad` east/west.
    pub fn expand(&self, lat_pad: f64, lon_pad: f64) -> Self {
        Self::new(
            self.max_lat + lat_pad,
            self.min_lat - lat_pad,
            self.max_lon + lon_pad,
            self.min_lon - lon_pad,
        )
    }
}
