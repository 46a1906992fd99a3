//! Thread-safe wrapper for concurrent database access.
//!
//! `SyncDB` wraps `DB` in `Arc<RwLock<DB>>`. Proximity and region queries take
//! the read lock and run concurrently; inserts, seeding and `clear` take the
//! write lock, so a reader sees either all of a write or none of it.
//!
//! # Examples
//!
//! ```rust
//! use incidex::{SyncDB, Segment};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = SyncDB::memory()?;
//!
//! let writer = db.clone();
//! let handle = thread::spawn(move || {
//!     writer.insert(37.7750, -122.4190).unwrap();
//! });
//! handle.join().unwrap();
//!
//! let leg = Segment::from_coords(37.7750, -122.4200, 37.7750, -122.4180);
//! assert_eq!(db.count_near(&leg, 5.0)?, 1);
//! # Ok(())
//! # }
//! ```

use super::DB;
use crate::config::{Config, DbStats};
use crate::error::Result;
use crate::ingest::IngestReport;
use incidex_types::{BoundingBox, GeoPoint, LatLon, PointId, Segment};
use parking_lot::RwLock;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Thread-safe wrapper around `DB` using `Arc<RwLock<DB>>`.
///
/// - Implements `Clone` for sharing between threads
/// - Queries (`count_near`, `points_in`, `get`) share the read lock
/// - Writes (`insert`, `bulk_insert`, `seed_*`, `clear`) hold the write lock
///   for the whole call, so a seeding batch is applied as one unit
#[derive(Clone)]
pub struct SyncDB {
    inner: Arc<RwLock<DB>>,
}

impl SyncDB {
    /// Creates a new in-memory database with default configuration.
    pub fn memory() -> Result<Self> {
        Ok(Self::from_db(DB::memory()?))
    }

    /// Creates a new in-memory database with custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        Ok(Self::from_db(DB::memory_with_config(config)?))
    }

    /// Opens a snapshot-backed database at the specified path.
    #[cfg(feature = "snapshot")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_db(DB::open(path)?))
    }

    /// Opens a snapshot-backed database with custom configuration.
    #[cfg(feature = "snapshot")]
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: Config) -> Result<Self> {
        Ok(Self::from_db(DB::open_with_config(path, config)?))
    }

    /// Wrap an already built `DB`.
    pub fn from_db(db: DB) -> Self {
        Self {
            inner: Arc::new(RwLock::new(db)),
        }
    }

    // ===== Writes =====

    pub fn insert(&self, lat: f64, lon: f64) -> Result<PointId> {
        self.inner.write().insert(lat, lon)
    }

    pub fn bulk_insert<I>(&self, coords: I) -> Result<Vec<PointId>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.inner.write().bulk_insert(coords)
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.write().clear()
    }

    pub fn seed_from_source<I, S>(&self, lines: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.write().seed_from_source(lines)
    }

    /// Reads the whole source before taking the write lock.
    pub fn seed_from_reader<R: Read>(&self, reader: R) -> Result<IngestReport> {
        use std::io::{BufRead, BufReader};

        let lines = BufReader::new(reader)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?;
        self.seed_from_source(lines)
    }

    pub fn seed_from_file<P: AsRef<Path>>(&self, path: P) -> Result<IngestReport> {
        let path = path.as_ref();
        log::info!("Seeding incidents from {}", path.display());
        self.seed_from_reader(std::fs::File::open(path)?)
    }

    #[cfg(feature = "snapshot")]
    pub fn sync(&self) -> Result<()> {
        self.inner.write().sync()
    }

    // ===== Reads =====

    pub fn get(&self, id: PointId) -> Result<GeoPoint> {
        self.inner.read().get(id)
    }

    /// Copy of every stored point, taken under one read lock.
    pub fn all(&self) -> Vec<GeoPoint> {
        self.inner.read().all().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> DbStats {
        self.inner.read().stats()
    }

    pub fn config(&self) -> Config {
        self.inner.read().config().clone()
    }

    pub fn count_near(&self, segment: &Segment, distance: f64) -> Result<usize> {
        self.inner.read().count_near(segment, distance)
    }

    pub fn count_near_default(&self, segment: &Segment) -> Result<usize> {
        self.inner.read().count_near_default(segment)
    }

    pub fn count_near_coords(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        dest_lat: f64,
        dest_lon: f64,
        distance: f64,
    ) -> Result<usize> {
        self.inner
            .read()
            .count_near_coords(origin_lat, origin_lon, dest_lat, dest_lon, distance)
    }

    pub fn ids_near(&self, segment: &Segment, distance: f64) -> Result<Vec<PointId>> {
        self.inner.read().ids_near(segment, distance)
    }

    pub fn points_in(&self, bbox: &BoundingBox) -> Result<Vec<LatLon>> {
        self.inner.read().points_in(bbox)
    }

    pub fn points_in_bounds(
        &self,
        max_lat: f64,
        min_lat: f64,
        max_lon: f64,
        min_lon: f64,
    ) -> Result<Vec<LatLon>> {
        self.inner
            .read()
            .points_in_bounds(max_lat, min_lat, max_lon, min_lon)
    }

    pub fn count_in(&self, bbox: &BoundingBox) -> Result<usize> {
        self.inner.read().count_in(bbox)
    }

    #[cfg(feature = "geojson")]
    pub fn points_in_geojson(&self, bbox: &BoundingBox) -> Result<geojson::FeatureCollection> {
        self.inner.read().points_in_geojson(bbox)
    }

    /// Run several reads against one consistent view of the database.
    ///
    /// ```rust
    /// use incidex::SyncDB;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = SyncDB::memory()?;
    /// db.insert(1.0, 1.0)?;
    /// let (stored, indexed) = db.read(|db| (db.len(), db.index().len()));
    /// assert_eq!(stored, indexed);
    /// # Ok(())
    /// # }
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DB) -> R,
    {
        f(&self.inner.read())
    }
}

impl std::fmt::Debug for SyncDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDB").field("inner", &*self.inner.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceUnit;
    use std::thread;

    #[test]
    fn test_concurrent_inserts() {
        let db = SyncDB::memory().unwrap();
        let mut handles = vec![];

        for t in 0..4 {
            let db = db.clone();
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    db.insert(t as f64, i as f64 * 0.1).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.len(), 200);
        let ids: Vec<_> = db.all().iter().map(|p| p.id()).collect();
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn test_reads_during_writes_see_consistent_state() {
        let config = Config::default().with_distance_unit(DistanceUnit::Degrees);
        let db = SyncDB::memory_with_config(config).unwrap();

        let writer = {
            let db = db.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    db.insert(0.0, (i % 100) as f64 * 0.01).unwrap();
                }
            })
        };

        for _ in 0..50 {
            let (stored, indexed, near) = db.read(|db| {
                let near = db
                    .count_near(&Segment::from_coords(0.0, -1.0, 0.0, 2.0), 0.1)
                    .unwrap();
                (db.len(), db.index().len(), near)
            });
            assert_eq!(stored, indexed);
            assert_eq!(near, stored);
        }

        writer.join().unwrap();
        assert_eq!(db.stats().points, 200);
    }

    #[test]
    fn test_seed_through_shared_handle() {
        let db = SyncDB::memory().unwrap();
        let report = db
            .seed_from_reader("10 10\n20 20\nbogus\n".as_bytes())
            .unwrap();
        assert_eq!(report.inserted_count, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(db.points_in_bounds(25.0, 5.0, 25.0, 5.0).unwrap().len(), 2);
    }
}
