//! Seed ingestion: turning raw `lat lon` text lines into points.
//!
//! Parsing is separate from inserting so the `Abort` policy can validate a
//! whole source before touching the store.

use crate::compute::validation::validate_coordinate;
use crate::error::IncidexError;
use incidex_types::{LatLon, PointId};
use serde::{Deserialize, Serialize};

/// A seed line that could not be ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineError {
    /// 1-based position of the line in the source
    pub line_number: usize,
    /// The raw line as read
    pub line: String,
    pub reason: String,
}

impl LineError {
    pub fn into_error(self) -> IncidexError {
        IncidexError::Parse {
            line_number: self.line_number,
            line: self.line,
            reason: self.reason,
        }
    }
}

impl From<LineError> for IncidexError {
    fn from(err: LineError) -> Self {
        err.into_error()
    }
}

/// Outcome of a seeding call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted_count: usize,
    /// Ids assigned to the inserted points, in line order
    pub inserted_ids: Vec<PointId>,
    pub errors: Vec<LineError>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lines that parsed, each with its 1-based line number, plus those that did not.
#[derive(Debug, Default)]
pub struct ParsedLines {
    pub points: Vec<(usize, LatLon)>,
    pub errors: Vec<LineError>,
}

/// Parse one `lat lon` line.
///
/// Exactly two whitespace-separated decimal values are accepted, and the
/// pair must be a valid coordinate.
///
/// # Examples
///
/// ```
/// use incidex::ingest::parse_line;
/// use incidex_types::LatLon;
///
/// assert_eq!(parse_line("  37.77 -122.41 ").unwrap(), LatLon::new(37.77, -122.41));
/// assert!(parse_line("37.77").is_err());
/// assert!(parse_line("37.77 -122.41 5").is_err());
/// assert!(parse_line("north west").is_err());
/// assert!(parse_line("95.0 0.0").is_err());
/// ```
pub fn parse_line(line: &str) -> Result<LatLon, String> {
    let mut fields = line.split_whitespace();
    let (Some(lat), Some(lon), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(format!(
            "expected two whitespace-separated values, found {}",
            line.split_whitespace().count()
        ));
    };

    let lat: f64 = lat
        .parse()
        .map_err(|e| format!("latitude {:?} is not a number: {}", lat, e))?;
    let lon: f64 = lon
        .parse()
        .map_err(|e| format!("longitude {:?} is not a number: {}", lon, e))?;

    validate_coordinate(lat, lon).map_err(|e| match e {
        IncidexError::InvalidCoordinate { reason, .. } => reason,
        other => other.to_string(),
    })?;

    Ok(LatLon::new(lat, lon))
}

/// Parse every line of a source. Blank lines are skipped but still counted.
pub fn parse_lines<I, S>(lines: I) -> ParsedLines
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedLines::default();
    for (i, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let line_number = i + 1;
        match parse_line(line) {
            Ok(coord) => parsed.points.push((line_number, coord)),
            Err(reason) => parsed.errors.push(LineError {
                line_number,
                line: line.to_string(),
                reason,
            }),
        }
    }
    parsed
}
