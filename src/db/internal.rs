//! Internal database operations and state management.

use super::DBInner;
use crate::compute::spatial::GridIndex;
use crate::config::{Config, OnError};
use crate::error::{IncidexError, Result};
use crate::ingest::{IngestReport, ParsedLines};
use crate::storage::PointStore;
#[cfg(feature = "snapshot")]
use crate::storage::{SnapshotConfig, SnapshotFile};
use incidex_types::{GeoPoint, PointId};
#[cfg(feature = "snapshot")]
use std::path::Path;

impl DBInner {
    pub(crate) fn new_with_config(config: &Config) -> Self {
        Self {
            store: PointStore::new(),
            index: GridIndex::new(config.cell_size_degrees),
            config: config.clone(),
            #[cfg(feature = "snapshot")]
            snapshot_file: None,
            inserts: 0,
        }
    }

    /// Store a point and index it under the same `&mut` borrow, so no reader
    /// can observe one without the other.
    pub(super) fn insert_point(&mut self, lat: f64, lon: f64) -> Result<GeoPoint> {
        let point = self.store.insert(lat, lon)?;
        self.index_point(&point);
        Ok(point)
    }

    pub(super) fn bulk_insert<I>(&mut self, coords: I) -> Result<Vec<PointId>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let result = self.store.bulk_insert(coords);
        let stored: &[PointId] = match &result {
            Ok(ids) => ids.as_slice(),
            Err(IncidexError::BulkInsert { inserted, .. }) => inserted.as_slice(),
            Err(_) => &[],
        };

        for &id in stored {
            let point = self.store.get(id)?;
            self.index_point(&point);
        }
        result
    }

    fn index_point(&mut self, point: &GeoPoint) {
        self.index.add(point);
        self.inserts += 1;

        #[cfg(feature = "snapshot")]
        if let Some(ref mut snapshot) = self.snapshot_file {
            snapshot.record_operation();
        }
    }

    /// Insert pre-parsed seed lines according to the configured policy.
    pub(super) fn seed(&mut self, parsed: ParsedLines) -> Result<IngestReport> {
        let ParsedLines { points, mut errors } = parsed;

        if self.config.ingest.on_error == OnError::Abort && !errors.is_empty() {
            let first = errors.remove(0);
            log::warn!(
                "Seeding aborted at line {}: {}; nothing inserted",
                first.line_number,
                first.reason
            );
            return Err(first.into_error());
        }

        let mut report = IngestReport::default();
        for (_, coord) in points {
            let point = self.insert_point(coord.lat, coord.lon)?;
            report.inserted_ids.push(point.id());
        }
        report.inserted_count = report.inserted_ids.len();

        for error in &errors {
            log::warn!(
                "Skipping seed line {}: {} (line: {:?})",
                error.line_number,
                error.reason,
                error.line
            );
        }
        report.errors = errors;

        log::info!(
            "Seeded {} points ({} lines skipped); store holds {}",
            report.inserted_count,
            report.errors.len(),
            self.store.len()
        );

        Ok(report)
    }

    pub(super) fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.index.clear();

        #[cfg(feature = "snapshot")]
        if let Some(ref mut snapshot) = self.snapshot_file {
            snapshot.record_operation();
        }
        Ok(())
    }

    #[cfg(feature = "snapshot")]
    pub(super) fn attach_snapshot(&mut self, path: &Path) -> Result<()> {
        let snapshot = SnapshotFile::new(
            path,
            SnapshotConfig {
                auto_snapshot_ops: self.config.snapshot_auto_ops,
            },
        );

        if let Some(data) = snapshot.load()? {
            let count = data.points.len();
            self.store.restore(data.next_id, data.points)?;
            self.rebuild_index();
            log::info!(
                "Loaded {} points from snapshot {}",
                count,
                snapshot.path().display()
            );
        }

        self.snapshot_file = Some(snapshot);
        Ok(())
    }

    #[cfg(feature = "snapshot")]
    fn rebuild_index(&mut self) {
        self.index.clear();
        for point in self.store.all() {
            self.index.add(&point);
        }
        log::debug!(
            "Rebuilt grid index: {} points in {} cells",
            self.index.len(),
            self.index.occupied_cells()
        );
    }

    /// Write a snapshot if one is attached. Returns whether one was written.
    #[cfg(feature = "snapshot")]
    pub(super) fn write_snapshot(&mut self) -> Result<bool> {
        let Some(ref mut snapshot) = self.snapshot_file else {
            return Ok(false);
        };

        let points: Vec<GeoPoint> = self.store.all().collect();
        snapshot.save(self.store.next_id(), &points)?;
        log::debug!(
            "Wrote snapshot of {} points to {}",
            points.len(),
            snapshot.path().display()
        );
        Ok(true)
    }

    /// Write a snapshot once the configured number of writes has accumulated.
    ///
    /// Best effort: the write that triggered it has already been applied, so a
    /// failure is logged and the pending operations are kept for the next
    /// attempt or an explicit `sync`.
    #[cfg(feature = "snapshot")]
    pub(super) fn maybe_snapshot(&mut self) {
        if self
            .snapshot_file
            .as_ref()
            .is_some_and(SnapshotFile::should_snapshot)
            && let Err(e) = self.write_snapshot()
        {
            log::warn!("Auto-snapshot failed, will retry on a later write: {}", e);
        }
    }

    #[cfg(not(feature = "snapshot"))]
    pub(super) fn maybe_snapshot(&mut self) {}
}
