//! # Flight Data Types
//!
//! The value objects a decoded record turns into: GPS points with their
//! per-point telemetry, track bounds, flight-wide statistics, and mission
//! parameters. All of them are plain data; they are produced once by the
//! decode pipeline and never mutated afterwards.

use serde::Serialize;

/// One assembled telemetry frame: a GPS fix plus whatever per-point
/// signals had a valid sample at the same occurrence index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsPoint {
    /// Position in the accepted track, 0-based and gapless
    pub index: usize,

    /// Latitude in degrees, full precision
    pub latitude: f64,

    /// Longitude in degrees, full precision
    pub longitude: f64,

    /// Heading in degrees, when a valid sample aligned
    pub heading: Option<f64>,

    /// Velocity east-west component in m/s
    pub velocity_x: Option<f64>,

    /// Velocity north-south component in m/s
    pub velocity_y: Option<f64>,

    /// Spray flow rate in L/min
    pub spray_rate: Option<f64>,
}

impl GpsPoint {
    /// Ground speed in m/s derived from the velocity components, rounded
    /// to `decimals` places.
    ///
    /// Derived on demand rather than stored; `None` unless both
    /// components are present.
    #[must_use]
    pub fn speed_ms(&self, decimals: u32) -> Option<f64> {
        let vx = self.velocity_x?;
        let vy = self.velocity_y?;
        Some(round_to((vx * vx + vy * vy).sqrt(), decimals))
    }
}

/// Extremes of the accepted track
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsBounds {
    /// Southernmost latitude
    pub lat_min: f64,

    /// Northernmost latitude
    pub lat_max: f64,

    /// Westernmost longitude
    pub lon_min: f64,

    /// Easternmost longitude
    pub lon_max: f64,
}

impl GpsBounds {
    /// Midpoint of the latitude extremes.
    ///
    /// This is the center of the bounding box, not the centroid of the
    /// track points.
    #[must_use]
    pub fn center_lat(&self) -> f64 {
        (self.lat_min + self.lat_max) / 2.0
    }

    /// Midpoint of the longitude extremes.
    #[must_use]
    pub fn center_lon(&self) -> f64 {
        (self.lon_min + self.lon_max) / 2.0
    }
}

/// Flight-wide statistics over the per-point signals.
///
/// Every field is `None` when its signal contributed no samples; a track
/// without velocity data has no speed statistics rather than zeros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TelemetrySummary {
    /// Mean heading in degrees
    pub heading_avg: Option<f64>,

    /// Minimum heading in degrees
    pub heading_min: Option<f64>,

    /// Maximum heading in degrees
    pub heading_max: Option<f64>,

    /// Mean ground speed in m/s
    pub speed_avg_ms: Option<f64>,

    /// Minimum ground speed in m/s
    pub speed_min_ms: Option<f64>,

    /// Maximum ground speed in m/s
    pub speed_max_ms: Option<f64>,

    /// Mean spray rate in L/min
    pub spray_rate_avg: Option<f64>,

    /// Minimum spray rate in L/min
    pub spray_rate_min: Option<f64>,

    /// Maximum spray rate in L/min
    pub spray_rate_max: Option<f64>,
}

/// Per-flight mission parameters read once from the record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MissionParameters {
    /// Battery charge remaining in percent
    pub battery_percent: Option<f64>,

    /// Configured task speed
    pub task_speed: Option<i64>,

    /// Numeric mission identifier
    pub mission_code: Option<i64>,
}

impl MissionParameters {
    /// True when no parameter was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.battery_percent.is_none() && self.task_speed.is_none() && self.mission_code.is_none()
    }
}

/// Complete decoded output of one record blob.
///
/// A record that decodes to nothing is represented by the default value:
/// no points, no bounds, no summary, no mission parameters. That is the
/// pipeline's only degraded form; decoding never fails outright.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlightData {
    /// Accepted GPS track in flight order
    pub points: Vec<GpsPoint>,

    /// Track extremes, absent when no point was accepted
    pub bounds: Option<GpsBounds>,

    /// Flight-wide statistics, absent only before aggregation
    pub summary: Option<TelemetrySummary>,

    /// Mission parameters, absent when none were recovered
    pub mission: Option<MissionParameters>,
}

impl FlightData {
    /// Number of accepted GPS points.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.points.len()
    }

    /// True when decoding recovered no usable track.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rounds to `decimals` places, half away from zero.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
