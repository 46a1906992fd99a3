//! Database builder for flexible configuration
//!
//! This module provides a builder pattern for creating databases with a
//! snapshot path and an initial seed file.

use crate::config::Config;
use crate::db::{DB, SyncDB};
use crate::error::Result;
use crate::ingest::IngestReport;
use std::path::PathBuf;

/// Builder for database configuration with persistence and seeding.
///
/// Building loads the snapshot (if any) first; the seed file is only applied
/// when the store is still empty afterwards, so a restart reloads the
/// snapshot instead of ingesting the seed a second time.
#[derive(Debug)]
pub struct DBBuilder {
    #[cfg(feature = "snapshot")]
    snapshot_path: Option<PathBuf>,
    seed_path: Option<PathBuf>,
    config: Config,
    in_memory: bool,
}

impl DBBuilder {
    /// Create a new builder with default in-memory configuration.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "snapshot")]
            snapshot_path: None,
            seed_path: None,
            config: Config::default(),
            in_memory: true,
        }
    }

    /// Set the snapshot path for persistence. File is created on first sync and loaded on startup.
    #[cfg(feature = "snapshot")]
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self.in_memory = false;
        self
    }

    /// Seed from a `lat lon` text file when the store starts out empty.
    pub fn seed_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    /// Configure for in-memory storage with no persistence.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        #[cfg(feature = "snapshot")]
        {
            self.snapshot_path = None;
        }
        self
    }

    /// Set the database configuration (cell size, distance unit, ingestion policy).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the database. Loads the snapshot if configured, then seeds.
    pub fn build(self) -> Result<DB> {
        Ok(self.build_with_report()?.0)
    }

    /// Like [`build`](Self::build), also returning the seeding report when a
    /// seed file was applied.
    pub fn build_with_report(self) -> Result<(DB, Option<IngestReport>)> {
        let mut db = match (self.in_memory, self.snapshot_target()) {
            #[cfg(feature = "snapshot")]
            (false, Some(path)) => DB::open_with_config(path, self.config)?,
            _ => DB::memory_with_config(self.config)?,
        };

        let report = match self.seed_path {
            Some(path) if db.is_empty() => Some(db.seed_from_file(path)?),
            Some(path) => {
                log::info!(
                    "Store already holds {} points; skipping seed file {}",
                    db.len(),
                    path.display()
                );
                None
            }
            None => None,
        };

        Ok((db, report))
    }

    /// Build a [`SyncDB`] for sharing across threads.
    pub fn build_sync(self) -> Result<SyncDB> {
        Ok(SyncDB::from_db(self.build()?))
    }

    #[cfg(feature = "snapshot")]
    fn snapshot_target(&self) -> Option<PathBuf> {
        self.snapshot_path.clone()
    }

    #[cfg(not(feature = "snapshot"))]
    fn snapshot_target(&self) -> Option<PathBuf> {
        None
    }
}

impl Default for DBBuilder {
    fn default() -> Self {
        Self::new()
    }
}
