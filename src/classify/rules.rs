//! # Classification Rule Table
//!
//! Ordered rules mapping `(depth, field key)` buckets to semantic roles.
//!
//! ## Built-in Table
//!
//! The default table matches the field layout observed in current vendor
//! firmware. Coordinate windows come from the configured bounding box.
//!
//! | Depth | Key | Role | Window |
//! |-------|--------|-----------------|----------------------|
//! | 3 | dbl_1 | latitude | bounding box (open) |
//! | 3 | dbl_2 | longitude | bounding box (open) |
//! | 3 | dbl_3 | heading | -180..180 inclusive |
//! | 3 | flt_1 | velocity_x | -30..30 open |
//! | 3 | flt_2 | velocity_y | -30..30 open |
//! | 3 | flt_3 | spray_rate | 0..50 open |
//! | 2 | flt_39 | battery_percent | any |
//! | 2 | int_10 | task_speed | any |
//! | 2 | int_23 | mission_code | any |
//!
//! ## Matching
//!
//! Rules are tried in order and the first rule whose bucket exists wins
//! both the bucket and the role. A rule's window is not applied here; it
//! travels with the classified bucket and is enforced per value during
//! frame assembly, because dropping values at this stage would shift
//! occurrence indices out of alignment across buckets.

use serde::Deserialize;

use crate::classify::role::SignalRole;
use crate::config::BoundingBox;
use crate::error::{AgFlightError, Result};
use crate::wire::protocol::FieldKey;

/// Numeric acceptance window attached to a rule.
///
/// In TOML rule files a window is either the keyword `"any"` or a table
/// `{ min = ..., max = ..., inclusive = true/false }` (exclusive when
/// `inclusive` is omitted).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    /// Every value passes
    Any,

    /// Endpoints excluded
    Open { min: f64, max: f64 },

    /// Endpoints included
    Closed { min: f64, max: f64 },
}

impl ValueRange {
    /// Whether `value` falls inside the window.
    ///
    /// NaN never passes a bounded window.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Self::Any => true,
            Self::Open { min, max } => value > min && value < max,
            Self::Closed { min, max } => value >= min && value <= max,
        }
    }
}

impl<'de> Deserialize<'de> for ValueRange {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RangeSpec {
            Keyword(String),
            Window {
                min: f64,
                max: f64,
                #[serde(default)]
                inclusive: bool,
            },
        }

        match RangeSpec::deserialize(deserializer)? {
            RangeSpec::Keyword(word) if word == "any" => Ok(Self::Any),
            RangeSpec::Keyword(word) => Err(serde::de::Error::custom(format!(
                "unknown range keyword '{word}', expected \"any\" or a min/max table"
            ))),
            RangeSpec::Window { min, max, inclusive: true } => Ok(Self::Closed { min, max }),
            RangeSpec::Window { min, max, inclusive: false } => Ok(Self::Open { min, max }),
        }
    }
}

/// One entry of the classification table
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationRule {
    /// Nesting depth the bucket must sit at
    pub depth: u8,

    /// Field key pattern, e.g. `dbl_1`
    pub key: FieldKey,

    /// Acceptance window carried to the frame assembler
    pub range: ValueRange,

    /// Role the matching bucket receives
    pub role: SignalRole,
}

/// Ordered classification table; earlier rules win
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<ClassificationRule>,
}

impl RuleTable {
    /// Creates a table from rules in priority order.
    #[must_use]
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// The built-in table for the current firmware layout, with coordinate
    /// windows taken from `bounds`.
    #[must_use]
    pub fn default_for(bounds: &BoundingBox) -> Self {
        Self::new(vec![
            ClassificationRule {
                depth: 3,
                key: FieldKey::dbl(1),
                range: ValueRange::Open { min: bounds.lat_min, max: bounds.lat_max },
                role: SignalRole::Latitude,
            },
            ClassificationRule {
                depth: 3,
                key: FieldKey::dbl(2),
                range: ValueRange::Open { min: bounds.lon_min, max: bounds.lon_max },
                role: SignalRole::Longitude,
            },
            ClassificationRule {
                depth: 3,
                key: FieldKey::dbl(3),
                range: ValueRange::Closed { min: -180.0, max: 180.0 },
                role: SignalRole::Heading,
            },
            ClassificationRule {
                depth: 3,
                key: FieldKey::flt(1),
                range: ValueRange::Open { min: -30.0, max: 30.0 },
                role: SignalRole::VelocityX,
            },
            ClassificationRule {
                depth: 3,
                key: FieldKey::flt(2),
                range: ValueRange::Open { min: -30.0, max: 30.0 },
                role: SignalRole::VelocityY,
            },
            ClassificationRule {
                depth: 3,
                key: FieldKey::flt(3),
                range: ValueRange::Open { min: 0.0, max: 50.0 },
                role: SignalRole::SprayRate,
            },
            ClassificationRule {
                depth: 2,
                key: FieldKey::flt(39),
                range: ValueRange::Any,
                role: SignalRole::BatteryPercent,
            },
            ClassificationRule {
                depth: 2,
                key: FieldKey::int(10),
                range: ValueRange::Any,
                role: SignalRole::TaskSpeed,
            },
            ClassificationRule {
                depth: 2,
                key: FieldKey::int(23),
                range: ValueRange::Any,
                role: SignalRole::MissionCode,
            },
        ])
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Appends a rule at the lowest priority.
    pub fn push(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates every rule window.
    ///
    /// # Errors
    ///
    /// Returns [`AgFlightError::Rule`] for a window whose bounds are NaN
    /// or inverted. `Any` windows always validate.
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if let ValueRange::Open { min, max } | ValueRange::Closed { min, max } = rule.range {
                if min.is_nan() || max.is_nan() {
                    return Err(AgFlightError::Rule(format!(
                        "rule {index} ({} -> {}): range bound is NaN",
                        rule.key, rule.role
                    )));
                }
                if min > max {
                    return Err(AgFlightError::Rule(format!(
                        "rule {index} ({} -> {}): range minimum {min} exceeds maximum {max}",
                        rule.key, rule.role
                    )));
                }
            }
        }
        Ok(())
    }
}
