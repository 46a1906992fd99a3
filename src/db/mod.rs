//! Core database implementation for incidex.
//!
//! This module defines the main `DB` type: the point store and its grid index
//! bundled behind one handle, plus snapshot wiring and seeding.

use crate::compute::spatial::{self, GridIndex};
use crate::config::{Config, DbStats};
use crate::error::{IncidexError, Result};
use crate::ingest::{self, IngestReport};
use crate::storage::PointStore;
#[cfg(feature = "snapshot")]
use crate::storage::SnapshotFile;
use incidex_types::{BoundingBox, GeoPoint, LatLon, PointId, Segment};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

mod internal;
mod sync;

pub use sync::SyncDB;

/// Main incidex database structure (single-threaded by design).
///
/// The `DB` struct owns:
/// - The point store, the only place point ids are assigned
/// - The grid index, a derived view kept in step with the store
/// - The configuration (cell size, distance unit, ingestion policy)
/// - Optional snapshot persistence
///
/// Every write goes through `&mut self` and updates the store and the index
/// together, so a `DB` never exposes a point that is in one but not the
/// other. For shared use across threads, wrap it in [`SyncDB`].
///
/// # Examples
///
/// ```rust
/// use incidex::{Incidex, Segment, BoundingBox};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut db = Incidex::memory()?;
///
/// let report = db.seed_from_source(["37.7750 -122.4190", "37.7760 -122.4185", "oops"])?;
/// assert_eq!(report.inserted_count, 2);
/// assert_eq!(report.errors[0].line_number, 3);
///
/// // Incidents within 5 meters of a route leg
/// let leg = Segment::from_coords(37.7750, -122.4200, 37.7750, -122.4180);
/// assert_eq!(db.count_near_default(&leg)?, 1);
///
/// // Incidents inside the visible map region, in insertion order
/// let visible = db.points_in(&BoundingBox::new(37.78, 37.77, -122.41, -122.43))?;
/// assert_eq!(visible.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct DB {
    pub(crate) inner: DBInner,
}

pub(crate) struct DBInner {
    /// Canonical point storage
    pub store: PointStore,
    /// Grid index over `store`
    pub index: GridIndex,
    pub config: Config,
    #[cfg(feature = "snapshot")]
    pub snapshot_file: Option<SnapshotFile>,
    /// Inserts since the handle was created
    pub inserts: u64,
}

impl DB {
    /// Opens a database backed by a snapshot file, creating it on first sync.
    ///
    /// An existing snapshot is loaded and indexed before this returns, so the
    /// handle never answers queries against a partially restored store.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use incidex::Incidex;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("incidents.snap");
    ///
    /// let mut db = Incidex::open(&path)?;
    /// db.insert(40.7128, -74.0060)?;
    /// db.sync()?;
    /// drop(db);
    ///
    /// let db = Incidex::open(&path)?;
    /// assert_eq!(db.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "snapshot")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a snapshot-backed database with custom configuration.
    #[cfg(feature = "snapshot")]
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: Config) -> Result<Self> {
        let mut db = Self::memory_with_config(config)?;
        db.inner.attach_snapshot(path.as_ref())?;
        Ok(db)
    }

    /// Creates a new in-memory database.
    pub fn memory() -> Result<Self> {
        Self::memory_with_config(Config::default())
    }

    /// Create an in-memory database with custom configuration
    pub fn memory_with_config(config: Config) -> Result<Self> {
        config.validate().map_err(IncidexError::InvalidConfig)?;
        Ok(DB {
            inner: DBInner::new_with_config(&config),
        })
    }

    /// Create a database builder for snapshot paths and seed files.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use incidex::{Incidex, Config, DistanceUnit};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Incidex::builder()
    ///     .config(Config::default().with_distance_unit(DistanceUnit::Degrees))
    ///     .build()?;
    /// assert!(db.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> crate::builder::DBBuilder {
        crate::builder::DBBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Read-only access to the grid index.
    pub fn index(&self) -> &GridIndex {
        &self.inner.index
    }

    /// Get database statistics
    pub fn stats(&self) -> DbStats {
        DbStats {
            points: self.inner.store.len(),
            occupied_cells: self.inner.index.occupied_cells(),
            largest_cell: self.inner.index.largest_cell(),
            cell_size_degrees: self.inner.index.cell_size(),
            inserts: self.inner.inserts,
        }
    }

    // ===== Writes =====

    /// Inserts one incident and returns its id.
    ///
    /// Fails with `InvalidCoordinate` for non-finite or out-of-range input,
    /// leaving the store unchanged.
    pub fn insert(&mut self, lat: f64, lon: f64) -> Result<PointId> {
        let point = self.inner.insert_point(lat, lon)?;
        self.inner.maybe_snapshot();
        Ok(point.id())
    }

    /// Inserts each `(lat, lon)` in order, stopping at the first invalid one.
    ///
    /// On failure the returned `BulkInsert` error lists the ids inserted
    /// before the offending position; those points remain stored and indexed.
    pub fn bulk_insert<I>(&mut self, coords: I) -> Result<Vec<PointId>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let result = self.inner.bulk_insert(coords);
        self.inner.maybe_snapshot();
        result
    }

    /// Removes every point. Ids are not reused afterwards.
    pub fn clear(&mut self) -> Result<()> {
        let removed = self.inner.store.len();
        self.inner.clear()?;
        log::info!("Cleared {} points", removed);
        self.inner.maybe_snapshot();
        Ok(())
    }

    // ===== Reads =====

    /// Get a point by id
    pub fn get(&self, id: PointId) -> Result<GeoPoint> {
        self.inner.store.get(id)
    }

    /// Every stored point in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.inner.store.all()
    }

    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    // ===== Proximity =====

    /// Counts incidents within `distance` of `segment`, in the configured unit.
    pub fn count_near(&self, segment: &Segment, distance: f64) -> Result<usize> {
        spatial::count_near(
            &self.inner.index,
            segment,
            distance,
            self.inner.config.distance_unit,
        )
    }

    /// Counts incidents within the configured `proximity_distance` of `segment`.
    pub fn count_near_default(&self, segment: &Segment) -> Result<usize> {
        self.count_near(segment, self.inner.config.proximity_distance)
    }

    /// `count_near` taking raw origin/destination coordinates.
    pub fn count_near_coords(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        dest_lat: f64,
        dest_lon: f64,
        distance: f64,
    ) -> Result<usize> {
        let segment = Segment::from_coords(origin_lat, origin_lon, dest_lat, dest_lon);
        self.count_near(&segment, distance)
    }

    /// Ids of the incidents within `distance` of `segment`, ascending.
    pub fn ids_near(&self, segment: &Segment, distance: f64) -> Result<Vec<PointId>> {
        spatial::ids_near(
            &self.inner.index,
            segment,
            distance,
            self.inner.config.distance_unit,
        )
    }

    // ===== Region =====

    /// Incidents inside `bbox`, edges inclusive, ordered by ascending id.
    ///
    /// Fails with `InvalidBoundingBox` for inverted bounds, and with
    /// `RegionLimitExceeded` when `max_region_results` is set and exceeded.
    pub fn points_in(&self, bbox: &BoundingBox) -> Result<Vec<LatLon>> {
        spatial::points_in(
            &self.inner.index,
            bbox,
            self.inner.config.max_region_results,
        )
    }

    /// `points_in` taking raw bounds in `(max_lat, min_lat, max_lon, min_lon)` order.
    pub fn points_in_bounds(
        &self,
        max_lat: f64,
        min_lat: f64,
        max_lon: f64,
        min_lon: f64,
    ) -> Result<Vec<LatLon>> {
        self.points_in(&BoundingBox::new(max_lat, min_lat, max_lon, min_lon))
    }

    /// Number of incidents inside `bbox`. Not subject to the region cap.
    pub fn count_in(&self, bbox: &BoundingBox) -> Result<usize> {
        spatial::count_in(&self.inner.index, bbox)
    }

    /// `points_in` rendered as a GeoJSON `FeatureCollection` of points.
    #[cfg(feature = "geojson")]
    pub fn points_in_geojson(&self, bbox: &BoundingBox) -> Result<geojson::FeatureCollection> {
        let points = self.points_in(bbox)?;
        Ok(crate::compute::geojson::points_to_feature_collection(
            &points,
        ))
    }

    // ===== Ingestion =====

    /// Parses and inserts `lat lon` lines under the configured `on_error` policy.
    ///
    /// Blank lines are skipped; line numbers in the report are 1-based and
    /// count blank lines. With `OnError::Abort` the first bad line is returned
    /// as a `Parse` error and nothing is inserted.
    pub fn seed_from_source<I, S>(&mut self, lines: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = ingest::parse_lines(lines);
        let report = self.inner.seed(parsed)?;
        self.inner.maybe_snapshot();
        Ok(report)
    }

    /// Seeds from any reader of newline-separated `lat lon` pairs.
    pub fn seed_from_reader<R: Read>(&mut self, reader: R) -> Result<IngestReport> {
        let lines = BufReader::new(reader)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?;
        self.seed_from_source(lines)
    }

    /// Seeds from a text file of `lat lon` lines.
    pub fn seed_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<IngestReport> {
        let path = path.as_ref();
        log::info!("Seeding incidents from {}", path.display());
        self.seed_from_reader(File::open(path)?)
    }

    // ===== Persistence =====

    /// Writes a snapshot of the store, if the database was opened with one.
    #[cfg(feature = "snapshot")]
    pub fn sync(&mut self) -> Result<()> {
        self.inner.write_snapshot()?;
        Ok(())
    }
}

impl std::fmt::Debug for DB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DB")
            .field("points", &self.inner.store.len())
            .field("cell_size_degrees", &self.inner.index.cell_size())
            .finish()
    }
}

/// Best-effort snapshot on drop when writes are pending.
#[cfg(feature = "snapshot")]
impl Drop for DB {
    fn drop(&mut self) {
        let pending = self
            .inner
            .snapshot_file
            .as_ref()
            .is_some_and(|s| s.pending_operations() > 0);

        if pending && let Err(e) = self.inner.write_snapshot() {
            log::warn!("Failed to write snapshot on drop: {}", e);
        }
    }
}
