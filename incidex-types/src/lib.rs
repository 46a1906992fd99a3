//! # incidex-types
//!
//! Value types shared by the incidex incident index and its callers:
//!
//! - **Points**: `GeoPoint` (a stored incident), `LatLon` (a bare coordinate pair)
//! - **Query inputs**: `Segment` (proximity queries), `BoundingBox` (region queries)
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! primitives. Coordinates follow the `geo` convention internally (`x` is
//! longitude, `y` is latitude) while every constructor takes latitude first.
//!
//! ## Examples
//!
//! ```rust
//! use incidex_types::{BoundingBox, LatLon, Segment};
//!
//! let leg = Segment::new(LatLon::new(37.7749, -122.4194), LatLon::new(37.7793, -122.4192));
//! assert!(!leg.is_degenerate());
//!
//! let view = BoundingBox::new(37.80, 37.70, -122.35, -122.50);
//! assert!(view.contains(37.7749, -122.4194));
//! ```

pub mod bbox;
pub mod point;
pub mod segment;

pub use bbox::BoundingBox;
pub use point::{GeoPoint, LatLon, PointId};
pub use segment::Segment;
