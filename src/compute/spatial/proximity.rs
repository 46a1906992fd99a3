//! Segment proximity: how many stored points lie within a distance of a leg.
//!
//! Distances are planar. In [`DistanceUnit::Degrees`] latitude and longitude
//! are used as-is. In [`DistanceUnit::Meters`] both are scaled onto a local
//! equirectangular projection centred on the segment's mid latitude, which is
//! accurate for the short legs route scoring deals in and degrades for legs
//! spanning many degrees or approaching the poles.

use super::grid::{Bucket, GridIndex, Padding};
use crate::compute::validation::{validate_distance, validate_segment};
use crate::config::DistanceUnit;
use crate::error::Result;
use geo::{Coord, coord};
use incidex_types::{PointId, Segment};
use std::f64::consts::PI;

/// Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Length of one degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * PI / 180.0;

/// Longitude padding that already covers every column.
const MAX_LON_PADDING: f64 = 360.0;

/// Degree-to-plane scaling used for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    x_scale: f64,
    y_scale: f64,
}

impl Projection {
    pub fn for_segment(segment: &Segment, unit: DistanceUnit) -> Self {
        match unit {
            DistanceUnit::Degrees => Self {
                x_scale: 1.0,
                y_scale: 1.0,
            },
            DistanceUnit::Meters => Self {
                x_scale: METERS_PER_DEGREE * segment.mid_lat().to_radians().cos().max(0.0),
                y_scale: METERS_PER_DEGREE,
            },
        }
    }

    pub fn project(&self, lat: f64, lon: f64) -> Coord<f64> {
        coord! { x: lon * self.x_scale, y: lat * self.y_scale }
    }

    /// Per-axis degree padding matching `distance` in projected units.
    pub fn padding(&self, distance: f64) -> Padding {
        let lon = if self.x_scale > f64::EPSILON {
            (distance / self.x_scale).min(MAX_LON_PADDING)
        } else {
            MAX_LON_PADDING
        };
        Padding {
            lat: distance / self.y_scale,
            lon,
        }
    }
}

/// Planar distance from `p` to the segment `a`-`b`.
///
/// Projects `p` onto the supporting line, clamps the projection parameter to
/// `[0, 1]` and measures to the clamped point. A zero-length segment falls
/// back to the distance to `a`.
///
/// # Examples
///
/// ```
/// use geo::coord;
/// use incidex::compute::spatial::proximity::point_segment_distance;
///
/// let a = coord! { x: 0.0, y: 0.0 };
/// let b = coord! { x: 10.0, y: 0.0 };
/// assert_eq!(point_segment_distance(coord! { x: 5.0, y: 3.0 }, a, b), 3.0);
/// assert_eq!(point_segment_distance(coord! { x: 13.0, y: 4.0 }, a, b), 5.0);
/// assert_eq!(point_segment_distance(coord! { x: 3.0, y: 4.0 }, a, a), 5.0);
/// ```
pub fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = b - a;
    let len_sq = d.x * d.x + d.y * d.y;
    if len_sq == 0.0 {
        return (p - a).x.hypot((p - a).y);
    }

    let t = (((p.x - a.x) * d.x + (p.y - a.y) * d.y) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;
    (p - closest).x.hypot((p - closest).y)
}

/// Distance from `(lat, lon)` to `segment` in `unit`.
pub fn distance_to_segment(lat: f64, lon: f64, segment: &Segment, unit: DistanceUnit) -> f64 {
    let projection = Projection::for_segment(segment, unit);
    let line = segment.line();
    point_segment_distance(
        projection.project(lat, lon),
        projection.project(line.start.y, line.start.x),
        projection.project(line.end.y, line.end.x),
    )
}

/// Exact proximity predicate bound to one segment and threshold.
struct Corridor {
    projection: Projection,
    a: Coord<f64>,
    b: Coord<f64>,
    distance: f64,
}

impl Corridor {
    fn new(segment: &Segment, distance: f64, unit: DistanceUnit) -> Self {
        let projection = Projection::for_segment(segment, unit);
        let line = segment.line();
        Self {
            projection,
            a: projection.project(line.start.y, line.start.x),
            b: projection.project(line.end.y, line.end.x),
            distance,
        }
    }

    fn contains(&self, lat: f64, lon: f64) -> bool {
        point_segment_distance(self.projection.project(lat, lon), self.a, self.b) <= self.distance
    }

    fn count(&self, bucket: &Bucket) -> usize {
        bucket.iter().filter(|e| self.contains(e.lat, e.lon)).count()
    }
}

/// Count indexed points within `distance` of `segment`.
///
/// An empty index yields 0. Validation failures leave the index untouched.
pub fn count_near(
    index: &GridIndex,
    segment: &Segment,
    distance: f64,
    unit: DistanceUnit,
) -> Result<usize> {
    validate_segment(segment)?;
    validate_distance(distance)?;

    let corridor = Corridor::new(segment, distance, unit);
    let buckets = index.cells_near(segment, corridor.projection.padding(distance));

    #[cfg(feature = "parallel")]
    let count = {
        use rayon::prelude::*;
        buckets.par_iter().map(|bucket| corridor.count(bucket)).sum()
    };

    #[cfg(not(feature = "parallel"))]
    let count = buckets.iter().map(|bucket| corridor.count(bucket)).sum();

    Ok(count)
}

/// Ids of the indexed points within `distance` of `segment`, ascending.
pub fn ids_near(
    index: &GridIndex,
    segment: &Segment,
    distance: f64,
    unit: DistanceUnit,
) -> Result<Vec<PointId>> {
    validate_segment(segment)?;
    validate_distance(distance)?;

    let corridor = Corridor::new(segment, distance, unit);
    let mut ids: Vec<PointId> = index
        .candidates_near(segment, corridor.projection.padding(distance))
        .filter(|e| corridor.contains(e.lat, e.lon))
        .map(|e| e.id)
        .collect();
    ids.sort_unstable();
    Ok(ids)
}
