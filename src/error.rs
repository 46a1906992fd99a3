//! Error types for incidex.

use incidex_types::PointId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IncidexError>;

/// Every failure the index reports. All of them are recoverable by the caller.
#[derive(Debug, Error)]
pub enum IncidexError {
    /// Latitude/longitude is non-finite or outside [-90, 90] / [-180, 180].
    #[error("invalid coordinate (lat={lat}, lon={lon}): {reason}")]
    InvalidCoordinate { lat: f64, lon: f64, reason: String },

    /// Region query bounds are inverted or non-finite.
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// A seed line could not be turned into a point. `line_number` is 1-based.
    #[error("parse error on line {line_number}: {reason} (line: {line:?})")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("point {0} not found")]
    NotFound(PointId),

    /// `bulk_insert` stopped at `position`; `inserted` holds the ids of every
    /// entry before it, which remain in the store.
    #[error("bulk insert stopped at position {position} after {} inserts: {source}", .inserted.len())]
    BulkInsert {
        inserted: Vec<PointId>,
        position: usize,
        #[source]
        source: Box<IncidexError>,
    },

    /// Proximity threshold is negative or non-finite.
    #[error("invalid distance threshold: {0}")]
    InvalidDistance(f64),

    #[error("region query matched {matched} points, exceeding the limit of {limit}")]
    RegionLimitExceeded { limit: usize, matched: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid snapshot format")]
    InvalidFormat,

    #[error("invalid timestamp")]
    InvalidTimestamp,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IncidexError {
    pub(crate) fn invalid_coordinate(lat: f64, lon: f64, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            lat,
            lon,
            reason: reason.into(),
        }
    }

    /// Line number for errors tied to a seed line.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Parse { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_insert_display_mentions_position_and_cause() {
        let err = IncidexError::BulkInsert {
            inserted: vec![1, 2],
            position: 2,
            source: Box::new(IncidexError::invalid_coordinate(95.0, 0.0, "latitude out of range")),
        };
        let msg = err.to_string();
        assert!(msg.contains("position 2"));
        assert!(msg.contains("after 2 inserts"));
        assert!(msg.contains("latitude out of range"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_line_number() {
        let err = IncidexError::Parse {
            line_number: 4,
            line: "abc".into(),
            reason: "expected two values".into(),
        };
        assert_eq!(err.line_number(), Some(4));
        assert_eq!(IncidexError::NotFound(3).line_number(), None);
    }
}
