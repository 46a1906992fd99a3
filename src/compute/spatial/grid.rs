//! Uniform lat/lon grid used as the spatial index.
//!
//! Points are bucketed by `(floor(lat / cell), floor(lon / cell))`. Inserting
//! is a hash lookup plus a push, with no rebalancing. Queries enumerate the
//! cells a query shape can touch and hand back whole buckets; callers apply
//! the exact predicate. When a query would touch more cells than the grid
//! holds, the occupied cells are scanned instead, which bounds the cost of
//! very large boxes and polar corridors.

use incidex_types::{BoundingBox, GeoPoint, PointId, Segment};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Bucket size that triggers a warning about the cell size being too coarse.
const LARGE_CELL_WARN_THRESHOLD: usize = 10_000;

/// Fraction of a cell added around column edges to absorb rounding in `floor`.
const EDGE_SLACK: f64 = 1e-9;

/// Finest supported cell size. Keeps every row and column index well inside
/// `i64`, so cell arithmetic cannot overflow.
pub const MIN_CELL_SIZE_DEGREES: f64 = 1e-9;

/// Row/column address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: i64,
    pub col: i64,
}

/// Index-side copy of a stored point.
///
/// The store owns the point; the index keeps the id plus the coordinates it
/// needs for exact filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub id: PointId,
    pub lat: f64,
    pub lon: f64,
}

impl From<&GeoPoint> for IndexEntry {
    fn from(point: &GeoPoint) -> Self {
        Self {
            id: point.id(),
            lat: point.lat(),
            lon: point.lon(),
        }
    }
}

pub type Bucket = SmallVec<[IndexEntry; 4]>;

/// Degrees of slack around a segment, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub lat: f64,
    pub lon: f64,
}

impl Padding {
    pub fn uniform(degrees: f64) -> Self {
        Self {
            lat: degrees,
            lon: degrees,
        }
    }
}

/// Grid spatial index over the point store.
///
/// # Examples
///
/// ```
/// use incidex::compute::spatial::grid::{GridIndex, Padding};
/// use incidex_types::{BoundingBox, GeoPoint, Segment};
///
/// let mut grid = GridIndex::new(1.0);
/// grid.add(&GeoPoint::new(1, 0.5, 5.5));
/// grid.add(&GeoPoint::new(2, 40.0, 40.0));
///
/// let near: Vec<_> = grid
///     .candidates_near(&Segment::from_coords(0.0, 0.0, 0.0, 10.0), Padding::uniform(1.0))
///     .map(|e| e.id)
///     .collect();
/// assert_eq!(near, vec![1]);
///
/// let inside = grid.candidates_in(&BoundingBox::new(45.0, 35.0, 45.0, 35.0)).count();
/// assert_eq!(inside, 1);
/// ```
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f64,
    cells: FxHashMap<CellKey, Bucket>,
    len: usize,
}

impl GridIndex {
    /// Create an empty grid. `cell_size` is in degrees and must be at least
    /// [`MIN_CELL_SIZE_DEGREES`].
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size.is_finite() && cell_size >= MIN_CELL_SIZE_DEGREES);
        Self {
            cell_size,
            cells: FxHashMap::default(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn largest_cell(&self) -> usize {
        self.cells.values().map(|b| b.len()).max().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    pub fn cell_key(&self, lat: f64, lon: f64) -> CellKey {
        CellKey {
            row: self.row_of(lat),
            col: self.col_of(lon),
        }
    }

    /// Index a point the store has already validated.
    pub fn add(&mut self, point: &GeoPoint) {
        let key = self.cell_key(point.lat(), point.lon());
        let bucket = self.cells.entry(key).or_default();
        bucket.push(IndexEntry::from(point));
        self.len += 1;

        if bucket.len() == LARGE_CELL_WARN_THRESHOLD {
            log::warn!(
                "Grid cell {:?} holds {} points; consider a smaller cell size than {} degrees",
                key,
                bucket.len(),
                self.cell_size
            );
        }
    }

    /// Ids of every indexed point, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.cells.values().flatten().map(|e| e.id)
    }

    /// Buckets of every cell intersecting `bbox`.
    ///
    /// Cells straddling the box edge are included whole, so entries still need
    /// an exact containment check.
    pub fn cells_in(&self, bbox: &BoundingBox) -> Vec<&Bucket> {
        let (Some(rows), Some(cols)) = (
            self.row_range(bbox.min_lat, bbox.max_lat),
            self.col_range(bbox.min_lon, bbox.max_lon),
        ) else {
            return Vec::new();
        };

        if span(rows, cols) > self.cells.len() as u128 {
            return self
                .cells
                .iter()
                .filter(|(key, _)| within(key.row, rows) && within(key.col, cols))
                .map(|(_, bucket)| bucket)
                .collect();
        }

        let mut buckets = Vec::new();
        for row in rows.0..=rows.1 {
            for col in cols.0..=cols.1 {
                if let Some(bucket) = self.cells.get(&CellKey { row, col }) {
                    buckets.push(bucket);
                }
            }
        }
        buckets
    }

    /// Buckets of every cell the padded corridor around `segment` can touch.
    ///
    /// Within each column the segment is clipped to the column's (padded)
    /// longitude range, so a diagonal segment only visits cells along its
    /// path rather than its whole envelope.
    pub fn cells_near(&self, segment: &Segment, padding: Padding) -> Vec<&Bucket> {
        let envelope = segment.envelope().expand(padding.lat, padding.lon);
        let (Some(rows), Some(cols)) = (
            self.row_range(envelope.min_lat, envelope.max_lat),
            self.col_range(envelope.min_lon, envelope.max_lon),
        ) else {
            return Vec::new();
        };

        if span(rows, cols) > self.cells.len() as u128 {
            log::debug!(
                "Corridor spans {} cells but only {} are occupied; scanning occupied cells",
                span(rows, cols),
                self.cells.len()
            );
            return self
                .cells
                .iter()
                .filter(|(key, _)| {
                    self.corridor_rows(segment, padding, key.col)
                        .is_some_and(|r| within(key.row, r))
                })
                .map(|(_, bucket)| bucket)
                .collect();
        }

        let mut buckets = Vec::new();
        for col in cols.0..=cols.1 {
            let Some(corridor) = self.corridor_rows(segment, padding, col) else {
                continue;
            };
            for row in corridor.0..=corridor.1 {
                if let Some(bucket) = self.cells.get(&CellKey { row, col }) {
                    buckets.push(bucket);
                }
            }
        }
        buckets
    }

    /// Candidate entries for a region query: a superset of the points in `bbox`.
    pub fn candidates_in(&self, bbox: &BoundingBox) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.cells_in(bbox).into_iter().flatten()
    }

    /// Candidate entries for a proximity query: a superset of the points within
    /// `padding` of `segment` on each axis.
    pub fn candidates_near(
        &self,
        segment: &Segment,
        padding: Padding,
    ) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.cells_near(segment, padding).into_iter().flatten()
    }

    fn row_of(&self, lat: f64) -> i64 {
        (lat / self.cell_size).floor() as i64
    }

    fn col_of(&self, lon: f64) -> i64 {
        (lon / self.cell_size).floor() as i64
    }

    /// Rows covering `[min_lat, max_lat]` clamped to valid latitudes.
    fn row_range(&self, min_lat: f64, max_lat: f64) -> Option<(i64, i64)> {
        let (lo, hi) = (min_lat.max(-90.0), max_lat.min(90.0));
        (lo <= hi).then(|| (self.row_of(lo), self.row_of(hi)))
    }

    /// Columns covering `[min_lon, max_lon]` clamped to valid longitudes.
    fn col_range(&self, min_lon: f64, max_lon: f64) -> Option<(i64, i64)> {
        let (lo, hi) = (min_lon.max(-180.0), max_lon.min(180.0));
        (lo <= hi).then(|| (self.col_of(lo), self.col_of(hi)))
    }

    /// Rows of column `col` that the padded corridor overlaps.
    fn corridor_rows(&self, segment: &Segment, padding: Padding, col: i64) -> Option<(i64, i64)> {
        let slack = self.cell_size * EDGE_SLACK;
        let lon_lo = col as f64 * self.cell_size - padding.lon - slack;
        let lon_hi = (col + 1) as f64 * self.cell_size + padding.lon + slack;

        let line = segment.line();
        let (a, b) = (line.start, line.end);
        let dx = b.x - a.x;

        let (t0, t1) = if dx == 0.0 {
            if a.x < lon_lo || a.x > lon_hi {
                return None;
            }
            (0.0, 1.0)
        } else {
            let ta = (lon_lo - a.x) / dx;
            let tb = (lon_hi - a.x) / dx;
            let (lo, hi) = (ta.min(tb).max(0.0), ta.max(tb).min(1.0));
            if lo > hi {
                return None;
            }
            (lo, hi)
        };

        let y0 = a.y + t0 * (b.y - a.y);
        let y1 = a.y + t1 * (b.y - a.y);
        self.row_range(
            y0.min(y1) - padding.lat - slack,
            y0.max(y1) + padding.lat + slack,
        )
    }
}

fn span(rows: (i64, i64), cols: (i64, i64)) -> u128 {
    let height = (rows.1 as i128 - rows.0 as i128 + 1).max(0) as u128;
    let width = (cols.1 as i128 - cols.0 as i128 + 1).max(0) as u128;
    height.saturating_mul(width)
}

fn within(value: i64, range: (i64, i64)) -> bool {
    value >= range.0 && value <= range.1
}
