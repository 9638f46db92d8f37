//! # Configuration Module
//!
//! Handles loading and validating decoder configuration from TOML files.
//!
//! Every section and field is optional; an empty file (or no file at all)
//! yields the built-in defaults, which target the current vendor firmware
//! and the Brazilian operating region. A `[[rules]]` array replaces the
//! built-in classification table entirely.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::classify::rules::{ClassificationRule, RuleTable};
use crate::error::Result;
use crate::wire::protocol::DEFAULT_MAX_DEPTH;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DecoderConfig {
    #[serde(default)]
    pub decoder: DecoderSection,

    #[serde(default)]
    pub bounds: BoundingBox,

    #[serde(default)]
    pub rounding: RoundingConfig,

    /// Replacement classification table; empty means use the built-in one
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
}

/// Wire-walking limits
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DecoderSection {
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
}

impl Default for DecoderSection {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Plausible coordinate window for the operating region.
///
/// The built-in rule table turns this box into the acceptance windows of
/// the latitude and longitude rules (exclusive on both ends).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    #[serde(default = "default_lat_min")]
    pub lat_min: f64,

    #[serde(default = "default_lat_max")]
    pub lat_max: f64,

    #[serde(default = "default_lon_min")]
    pub lon_min: f64,

    #[serde(default = "default_lon_max")]
    pub lon_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lat_min: default_lat_min(),
            lat_max: default_lat_max(),
            lon_min: default_lon_min(),
            lon_max: default_lon_max(),
        }
    }
}

/// Output rounding precision
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RoundingConfig {
    #[serde(default = "default_coordinate_decimals")]
    pub coordinate_decimals: u32,

    #[serde(default = "default_telemetry_decimals")]
    pub telemetry_decimals: u32,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            coordinate_decimals: default_coordinate_decimals(),
            telemetry_decimals: default_telemetry_decimals(),
        }
    }
}

// Default value functions
fn default_max_depth() -> u8 { DEFAULT_MAX_DEPTH }

fn default_lat_min() -> f64 { -35.0 }
fn default_lat_max() -> f64 { -5.0 }
fn default_lon_min() -> f64 { -75.0 }
fn default_lon_max() -> f64 { -35.0 }

fn default_coordinate_decimals() -> u32 { 6 }
fn default_telemetry_decimals() -> u32 { 2 }

impl DecoderConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<DecoderConfig>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use agflight::config::DecoderConfig;
    ///
    /// let config = DecoderConfig::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DecoderConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The classification table this configuration selects: the `[[rules]]`
    /// entries when present, otherwise the built-in table parameterized by
    /// the bounding box.
    #[must_use]
    pub fn rule_table(&self) -> RuleTable {
        if self.rules.is_empty() {
            RuleTable::default_for(&self.bounds)
        } else {
            RuleTable::new(self.rules.clone())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub(crate) fn validate(&self) -> Result<()> {
        // Validate recursion limit
        if self.decoder.max_depth > 32 {
            return Err(crate::error::AgFlightError::Config(
                toml::de::Error::custom("max_depth must be at most 32")
            ));
        }

        // Validate bounding box
        for (name, value) in [
            ("lat_min", self.bounds.lat_min),
            ("lat_max", self.bounds.lat_max),
            ("lon_min", self.bounds.lon_min),
            ("lon_max", self.bounds.lon_max),
        ] {
            if !value.is_finite() {
                return Err(crate::error::AgFlightError::Config(
                    toml::de::Error::custom(format!("{} must be finite", name))
                ));
            }
        }

        if self.bounds.lat_min >= self.bounds.lat_max {
            return Err(crate::error::AgFlightError::Config(
                toml::de::Error::custom("lat_min must be less than lat_max")
            ));
        }

        if self.bounds.lon_min >= self.bounds.lon_max {
            return Err(crate::error::AgFlightError::Config(
                toml::de::Error::custom("lon_min must be less than lon_max")
            ));
        }

        // Validate rounding precision
        if self.rounding.coordinate_decimals > 12 {
            return Err(crate::error::AgFlightError::Config(
                toml::de::Error::custom("coordinate_decimals must be at most 12")
            ));
        }

        if self.rounding.telemetry_decimals > 12 {
            return Err(crate::error::AgFlightError::Config(
                toml::de::Error::custom("telemetry_decimals must be at most 12")
            ));
        }

        // Validate the selected rule table (built-in or [[rules]] override)
        self.rule_table().validate()?;

        Ok(())
    }
}
