//! Compute layer for query processing and algorithms.
//!
//! This module separates geometry and query logic from storage concerns:
//! - Input validation
//! - The grid spatial index
//! - Proximity and region queries
//! - GeoJSON export of query results
//!
//! Nothing here owns points; the index is a derived view built from the
//! point store.

#[cfg(feature = "geojson")]
pub mod geojson;
pub mod spatial;
pub mod validation;
