//! # Semantic Signal Roles

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic meaning a classification rule can assign to a value bucket.
///
/// Per-point roles contribute one sample to every assembled frame;
/// per-flight roles are read once from the first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalRole {
    /// GPS latitude in degrees
    Latitude,

    /// GPS longitude in degrees
    Longitude,

    /// Heading in degrees, -180 to 180
    Heading,

    /// Velocity east-west component in m/s
    VelocityX,

    /// Velocity north-south component in m/s
    VelocityY,

    /// Spray flow rate in L/min
    SprayRate,

    /// Battery charge remaining, per flight
    BatteryPercent,

    /// Configured task speed, per flight
    TaskSpeed,

    /// Numeric mission identifier, per flight
    MissionCode,
}

impl SignalRole {
    /// Stable name used in rule files and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Heading => "heading",
            Self::VelocityX => "velocity_x",
            Self::VelocityY => "velocity_y",
            Self::SprayRate => "spray_rate",
            Self::BatteryPercent => "battery_percent",
            Self::TaskSpeed => "task_speed",
            Self::MissionCode => "mission_code",
        }
    }
}

impl fmt::Display for SignalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
