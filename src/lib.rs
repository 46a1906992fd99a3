//! In-memory incident index answering segment-proximity and region queries.
//!
//! Incidents are stored as latitude/longitude points and bucketed in a
//! uniform grid. Two queries run against them: how many incidents lie within
//! a distance of a route leg, and which incidents lie inside a map region.
//!
//! ```rust
//! use incidex::{BoundingBox, Config, DistanceUnit, Incidex, LatLon, Segment};
//!
//! let config = Config::default().with_distance_unit(DistanceUnit::Degrees);
//! let mut db = Incidex::memory_with_config(config)?;
//! db.bulk_insert([(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)])?;
//!
//! let visible = db.points_in(&BoundingBox::new(25.0, 5.0, 25.0, 5.0))?;
//! assert_eq!(visible, vec![LatLon::new(10.0, 10.0), LatLon::new(20.0, 20.0)]);
//!
//! let leg = Segment::from_coords(10.0, 0.0, 10.0, 15.0);
//! assert_eq!(db.count_near(&leg, 1.0)?, 1);
//! # Ok::<(), incidex::IncidexError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod storage;

pub use builder::DBBuilder;
pub use db::{DB, SyncDB};
pub use error::{IncidexError, Result};

pub type Incidex = DB;

pub use config::{Config, DbStats, DistanceUnit, IngestConfig, OnError};

pub use ingest::{IngestReport, LineError};

pub use incidex_types::{BoundingBox, GeoPoint, LatLon, PointId, Segment};

pub use storage::{MemoryBackend, PointStore, StorageBackend, StorageStats};

#[cfg(feature = "snapshot")]
pub use storage::{SnapshotConfig, SnapshotFile};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DBBuilder, Incidex, IncidexError, Result, SyncDB};

    pub use crate::{BoundingBox, GeoPoint, LatLon, PointId, Segment};

    pub use crate::{Config, DistanceUnit, OnError};

    pub use crate::{IngestReport, LineError};
}
