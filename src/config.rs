//! Configuration for the incident index.
//!
//! `Config` is serializable so hosts can load it from JSON or, with the
//! `toml` feature, TOML.
use crate::compute::spatial::MIN_CELL_SIZE_DEGREES;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// How proximity thresholds are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Meters on a local equirectangular projection centred on the segment.
    #[default]
    Meters,
    /// Raw degrees, treating latitude/longitude as a flat plane.
    Degrees,
}

/// What seeding does when a line cannot be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OnError {
    /// Validate every line first and insert nothing if any line fails.
    Abort,
    /// Insert the valid lines and report each failed one.
    #[default]
    #[serde(alias = "skip_and_report")]
    SkipAndReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    #[serde(default, rename = "onError")]
    pub on_error: OnError,
}

/// Index configuration
///
/// # Example
///
/// ```rust
/// use incidex::{Config, DistanceUnit, OnError};
///
/// let json = r#"{
///     "cell_size_degrees": 0.01,
///     "distance_unit": "degrees",
///     "ingest": { "onError": "abort" }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.distance_unit, DistanceUnit::Degrees);
/// assert_eq!(config.ingest.on_error, OnError::Abort);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Edge length of a grid cell in degrees.
    #[serde(default = "Config::default_cell_size_degrees")]
    pub cell_size_degrees: f64,

    #[serde(default)]
    pub distance_unit: DistanceUnit,

    /// Threshold used by `count_near_default`, in `distance_unit`.
    #[serde(default = "Config::default_proximity_distance")]
    pub proximity_distance: f64,

    #[serde(default)]
    pub ingest: IngestConfig,

    /// Reject region queries matching more points than this.
    #[serde(default)]
    pub max_region_results: Option<usize>,

    /// Write a snapshot after this many inserts (needs a snapshot path).
    #[serde(default)]
    pub snapshot_auto_ops: Option<usize>,
}

impl Config {
    const fn default_cell_size_degrees() -> f64 {
        0.001
    }

    const fn default_proximity_distance() -> f64 {
        5.0
    }

    pub fn with_cell_size(mut self, degrees: f64) -> Self {
        assert!(
            degrees.is_finite() && (MIN_CELL_SIZE_DEGREES..=90.0).contains(&degrees),
            "Cell size must be in [{}, 90] degrees",
            MIN_CELL_SIZE_DEGREES
        );

        if degrees > 1.0 {
            log::warn!(
                "Cell size of {} degrees is very coarse; queries will scan many points per cell",
                degrees
            );
        }

        self.cell_size_degrees = degrees;
        self
    }

    pub fn with_distance_unit(mut self, unit: DistanceUnit) -> Self {
        self.distance_unit = unit;
        self
    }

    pub fn with_proximity_distance(mut self, distance: f64) -> Self {
        self.proximity_distance = distance;
        self
    }

    pub fn with_on_error(mut self, on_error: OnError) -> Self {
        self.ingest.on_error = on_error;
        self
    }

    pub fn with_max_region_results(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Region result limit must be greater than zero");
        self.max_region_results = Some(limit);
        self
    }

    pub fn with_snapshot_auto_ops(mut self, ops: usize) -> Self {
        assert!(ops > 0, "Snapshot interval must be greater than zero");
        self.snapshot_auto_ops = Some(ops);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.cell_size_degrees.is_finite()
            || !(MIN_CELL_SIZE_DEGREES..=90.0).contains(&self.cell_size_degrees)
        {
            return Err(format!(
                "Cell size must be in [{}, 90] degrees, got {}",
                MIN_CELL_SIZE_DEGREES, self.cell_size_degrees
            ));
        }

        if !self.proximity_distance.is_finite() || self.proximity_distance < 0.0 {
            return Err(format!(
                "Proximity distance must be finite and non-negative, got {}",
                self.proximity_distance
            ));
        }

        if self.max_region_results == Some(0) {
            return Err("Region result limit must be greater than zero".to_string());
        }

        if self.snapshot_auto_ops == Some(0) {
            return Err("Snapshot interval must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size_degrees: Self::default_cell_size_degrees(),
            distance_unit: DistanceUnit::default(),
            proximity_distance: Self::default_proximity_distance(),
            ingest: IngestConfig::default(),
            max_region_results: None,
            snapshot_auto_ops: None,
        }
    }
}

/// Point store and index statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbStats {
    /// Number of points in the store
    pub points: usize,
    /// Number of grid cells holding at least one point
    pub occupied_cells: usize,
    /// Size of the fullest cell
    pub largest_cell: usize,
    pub cell_size_degrees: f64,
    /// Inserts since the handle was created (including seeding)
    pub inserts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cell_size_degrees, 0.001);
        assert_eq!(config.distance_unit, DistanceUnit::Meters);
        assert_eq!(config.proximity_distance, 5.0);
        assert_eq!(config.ingest.on_error, OnError::SkipAndReport);
        assert!(config.max_region_results.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_cell_size(0.05)
            .with_distance_unit(DistanceUnit::Degrees)
            .with_on_error(OnError::Abort)
            .with_max_region_results(500);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"onError\": \"abort\""));

        let deserialized = Config::from_json(&json).unwrap();
        assert_eq!(deserialized.cell_size_degrees, 0.05);
        assert_eq!(deserialized.distance_unit, DistanceUnit::Degrees);
        assert_eq!(deserialized.ingest.on_error, OnError::Abort);
        assert_eq!(deserialized.max_region_results, Some(500));
    }

    #[test]
    fn test_on_error_accepts_both_spellings() {
        let a: IngestConfig = serde_json::from_str(r#"{"onError": "skipAndReport"}"#).unwrap();
        let b: IngestConfig = serde_json::from_str(r#"{"onError": "skip_and_report"}"#).unwrap();
        assert_eq!(a.on_error, OnError::SkipAndReport);
        assert_eq!(b.on_error, OnError::SkipAndReport);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.cell_size_degrees = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.proximity_distance = -1.0;
        assert!(config.validate().is_err());

        assert!(Config::from_json(r#"{"cell_size_degrees": -2.0}"#).is_err());
        assert!(Config::from_json(r#"{"cell_size_degrees": 1e-20}"#).is_err());

        let mut config = Config::default();
        config.cell_size_degrees = 1e-20;
        assert!(config.validate().is_err());
        config.cell_size_degrees = MIN_CELL_SIZE_DEGREES;
        assert!(config.validate().is_ok());

        assert!(Config::from_json(r#"{"unknown_field": 1}"#).is_err());
    }

    #[test]
    #[should_panic(expected = "Cell size must be in")]
    fn test_with_cell_size_rejects_too_fine() {
        let _ = Config::default().with_cell_size(1e-20);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let config = Config::from_toml("cell_size_degrees = 0.01\n[ingest]\nonError = \"abort\"\n")
            .unwrap();
        assert_eq!(config.cell_size_degrees, 0.01);
        assert_eq!(config.ingest.on_error, OnError::Abort);
        assert!(config.to_toml().unwrap().contains("cell_size_degrees"));
    }
}
