pub mod grid;
pub use grid::{CellKey, GridIndex, IndexEntry, MIN_CELL_SIZE_DEGREES, Padding};

pub mod proximity;
pub use proximity::{Projection, count_near, distance_to_segment, ids_near, point_segment_distance};

pub mod region;
pub use region::{count_in, points_in};
