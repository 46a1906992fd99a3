//! Point storage for incidex.
//!
//! [`StorageBackend`] abstracts where points live; [`PointStore`] sits on top
//! of a backend and is the only place ids are assigned. Points are append-only:
//! there is no update, and removal is a full reset that keeps the id counter.

mod memory;
#[cfg(feature = "snapshot")]
mod snapshot;

pub use memory::MemoryBackend;
#[cfg(feature = "snapshot")]
pub use snapshot::{SnapshotConfig, SnapshotData, SnapshotFile};

use crate::compute::validation::validate_coordinate;
use crate::error::{IncidexError, Result};
use incidex_types::{GeoPoint, PointId};

/// Trait for storage backend implementations
///
/// Backends receive points with strictly increasing ids and must hand them
/// back in that order.
pub trait StorageBackend: Send + Sync {
    /// Append a point whose id is greater than every stored id
    fn append(&mut self, point: GeoPoint) -> Result<()>;

    /// Get a point by id
    fn get(&self, id: PointId) -> Result<Option<GeoPoint>>;

    /// Get the total number of points
    fn len(&self) -> usize;

    /// Check if the storage is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest stored id, if any
    fn last_id(&self) -> Option<PointId>;

    /// Iterator over all points in ascending id order
    fn iter(&self) -> Box<dyn Iterator<Item = GeoPoint> + '_>;

    /// Remove every point
    fn clear(&mut self) -> Result<()>;

    /// Get storage statistics
    fn stats(&self) -> StorageStats;
}

/// Storage backend statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageStats {
    /// Total number of points
    pub point_count: usize,
    /// Storage size in bytes (approximate)
    pub size_bytes: usize,
    /// Number of operations performed
    pub operations_count: u64,
}

/// The canonical, id-assigning collection of points.
///
/// # Examples
///
/// ```
/// use incidex::storage::PointStore;
///
/// let mut store = PointStore::new();
/// let id = store.insert(37.7749, -122.4194)?.id();
/// assert_eq!(store.get(id)?.lat(), 37.7749);
/// assert!(store.insert(91.0, 0.0).is_err());
/// assert_eq!(store.len(), 1);
/// # Ok::<(), incidex::IncidexError>(())
/// ```
pub struct PointStore {
    backend: Box<dyn StorageBackend>,
    next_id: PointId,
}

impl PointStore {
    /// First id handed out by an empty store.
    pub const FIRST_ID: PointId = 1;

    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    /// Wrap an existing backend; ids continue after its highest stored id.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        let next_id = backend.last_id().map_or(Self::FIRST_ID, |id| id + 1);
        Self { backend, next_id }
    }

    /// Validate and append a point, assigning the next id.
    ///
    /// A rejected coordinate leaves the store unchanged and consumes no id.
    pub fn insert(&mut self, lat: f64, lon: f64) -> Result<GeoPoint> {
        validate_coordinate(lat, lon)?;

        let point = GeoPoint::new(self.next_id, lat, lon);
        self.backend.append(point)?;
        self.next_id += 1;
        Ok(point)
    }

    /// Insert each `(lat, lon)` in order, stopping at the first failure.
    ///
    /// On failure the error carries the ids inserted before the offending
    /// position; those points stay in the store.
    pub fn bulk_insert<I>(&mut self, coords: I) -> Result<Vec<PointId>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut inserted = Vec::new();
        for (position, (lat, lon)) in coords.into_iter().enumerate() {
            match self.insert(lat, lon) {
                Ok(point) => inserted.push(point.id()),
                Err(e) => {
                    return Err(IncidexError::BulkInsert {
                        inserted,
                        position,
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(inserted)
    }

    pub fn get(&self, id: PointId) -> Result<GeoPoint> {
        self.backend.get(id)?.ok_or(IncidexError::NotFound(id))
    }

    /// Fresh pass over every stored point in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.backend.iter()
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Id the next insert will receive.
    pub fn next_id(&self) -> PointId {
        self.next_id
    }

    /// Remove every point. Ids are never reused, so the counter is kept.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.clear()
    }

    pub fn stats(&self) -> StorageStats {
        self.backend.stats()
    }

    /// Replace the contents with previously persisted points.
    ///
    /// Ids must be strictly increasing and below `next_id`.
    pub(crate) fn restore(&mut self, next_id: PointId, points: Vec<GeoPoint>) -> Result<()> {
        let mut previous: Option<PointId> = None;
        for point in &points {
            validate_coordinate(point.lat(), point.lon()).map_err(|_| IncidexError::InvalidFormat)?;
            if previous.is_some_and(|p| p >= point.id()) || point.id() >= next_id {
                return Err(IncidexError::InvalidFormat);
            }
            previous = Some(point.id());
        }

        self.backend.clear()?;
        for point in points {
            self.backend.append(point)?;
        }
        self.next_id = next_id.max(Self::FIRST_ID);
        Ok(())
    }
}

impl Default for PointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointStore")
            .field("len", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
