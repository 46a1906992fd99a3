//! Region containment: which stored points fall inside a bounding box.

use super::grid::{GridIndex, IndexEntry};
use crate::compute::validation::validate_bounding_box;
use crate::error::{IncidexError, Result};
use incidex_types::{BoundingBox, LatLon};

/// Points inside `bbox` (edges inclusive), ordered by ascending point id.
///
/// With `limit` set, a query matching more points fails with
/// `RegionLimitExceeded` instead of returning a partial list.
///
/// # Examples
///
/// ```
/// use incidex::compute::spatial::{grid::GridIndex, region::points_in};
/// use incidex_types::{BoundingBox, GeoPoint, LatLon};
///
/// let mut grid = GridIndex::new(1.0);
/// for (id, c) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
///     grid.add(&GeoPoint::new(id, c, c));
/// }
///
/// let found = points_in(&grid, &BoundingBox::new(25.0, 5.0, 25.0, 5.0), None).unwrap();
/// assert_eq!(found, vec![LatLon::new(10.0, 10.0), LatLon::new(20.0, 20.0)]);
/// ```
pub fn points_in(index: &GridIndex, bbox: &BoundingBox, limit: Option<usize>) -> Result<Vec<LatLon>> {
    let mut hits = entries_in(index, bbox)?;

    if let Some(limit) = limit
        && hits.len() > limit
    {
        return Err(IncidexError::RegionLimitExceeded {
            limit,
            matched: hits.len(),
        });
    }

    hits.sort_unstable_by_key(|e| e.id);
    Ok(hits.into_iter().map(|e| LatLon::new(e.lat, e.lon)).collect())
}

/// Number of points inside `bbox`, without materialising them.
pub fn count_in(index: &GridIndex, bbox: &BoundingBox) -> Result<usize> {
    Ok(entries_in(index, bbox)?.len())
}

fn entries_in<'a>(index: &'a GridIndex, bbox: &BoundingBox) -> Result<Vec<&'a IndexEntry>> {
    validate_bounding_box(bbox)?;
    Ok(index
        .cells_in(bbox)
        .into_iter()
        .flatten()
        .filter(|e| bbox.contains(e.lat, e.lon))
        .collect())
}
