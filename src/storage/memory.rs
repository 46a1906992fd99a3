//! In-memory storage backend.

use super::{StorageBackend, StorageStats};
use crate::error::{IncidexError, Result};
use incidex_types::{GeoPoint, PointId};

/// Points held in a `Vec` kept in ascending id order.
///
/// Ids arrive strictly increasing, so appends stay sorted and lookups are a
/// binary search.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    points: Vec<GeoPoint>,
    stats: StorageStats,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            stats: StorageStats::default(),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn append(&mut self, point: GeoPoint) -> Result<()> {
        if let Some(last) = self.points.last()
            && last.id() >= point.id()
        {
            return Err(IncidexError::InvalidFormat);
        }

        self.points.push(point);
        self.stats.point_count = self.points.len();
        self.stats.size_bytes += std::mem::size_of::<GeoPoint>();
        self.stats.operations_count += 1;
        Ok(())
    }

    fn get(&self, id: PointId) -> Result<Option<GeoPoint>> {
        Ok(self
            .points
            .binary_search_by_key(&id, |p| p.id())
            .ok()
            .map(|i| self.points[i]))
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn last_id(&self) -> Option<PointId> {
        self.points.last().map(|p| p.id())
    }

    fn iter(&self) -> Box<dyn Iterator<Item = GeoPoint> + '_> {
        Box::new(self.points.iter().copied())
    }

    fn clear(&mut self) -> Result<()> {
        self.points.clear();
        self.stats.point_count = 0;
        self.stats.size_bytes = 0;
        self.stats.operations_count += 1;
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_basic_operations() {
        let mut backend = MemoryBackend::new();
        assert!(backend.is_empty());

        backend.append(GeoPoint::new(1, 10.0, 20.0)).unwrap();
        backend.append(GeoPoint::new(4, 11.0, 21.0)).unwrap();

        assert_eq!(backend.len(), 2);
        assert_eq!(backend.last_id(), Some(4));
        assert_eq!(backend.get(4).unwrap().map(|p| p.lat()), Some(11.0));
        assert!(backend.get(2).unwrap().is_none());

        let ids: Vec<_> = backend.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_append_rejects_out_of_order_ids() {
        let mut backend = MemoryBackend::new();
        backend.append(GeoPoint::new(5, 0.0, 0.0)).unwrap();
        assert!(backend.append(GeoPoint::new(5, 1.0, 1.0)).is_err());
        assert!(backend.append(GeoPoint::new(3, 1.0, 1.0)).is_err());
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut backend = MemoryBackend::with_capacity(8);
        backend.append(GeoPoint::new(1, 0.0, 0.0)).unwrap();
        backend.append(GeoPoint::new(2, 0.0, 0.0)).unwrap();

        let stats = backend.stats();
        assert_eq!(stats.point_count, 2);
        assert_eq!(stats.operations_count, 2);
        assert!(stats.size_bytes > 0);

        backend.clear().unwrap();
        let stats = backend.stats();
        assert_eq!(stats.point_count, 0);
        assert_eq!(stats.size_bytes, 0);
        assert_eq!(stats.operations_count, 3);
    }
}
