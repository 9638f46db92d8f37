//! # Telemetry Aggregation
//!
//! Flight-wide statistics over the assembled track: coordinate extremes
//! and average/min/max for each per-point signal. Points that lack a
//! signal simply do not contribute to that signal's statistics; they are
//! never counted as zero.

use crate::flight::data::{round_to, GpsBounds, GpsPoint, TelemetrySummary};

/// Coordinate extremes of the track, or `None` for an empty track.
pub fn compute_bounds(points: &[GpsPoint]) -> Option<GpsBounds> {
    let first = points.first()?;
    let mut bounds = GpsBounds {
        lat_min: first.latitude,
        lat_max: first.latitude,
        lon_min: first.longitude,
        lon_max: first.longitude,
    };

    for point in &points[1..] {
        bounds.lat_min = bounds.lat_min.min(point.latitude);
        bounds.lat_max = bounds.lat_max.max(point.latitude);
        bounds.lon_min = bounds.lon_min.min(point.longitude);
        bounds.lon_max = bounds.lon_max.max(point.longitude);
    }

    Some(bounds)
}

/// Average, minimum and maximum of heading, ground speed, and spray rate.
///
/// Statistics are rounded to `decimals` places. A signal with no
/// contributing points yields `None` for all three of its statistics,
/// including on an empty track.
pub fn compute_telemetry(points: &[GpsPoint], decimals: u32) -> TelemetrySummary {
    let headings: Vec<f64> = points.iter().filter_map(|p| p.heading).collect();
    let speeds: Vec<f64> = points.iter().filter_map(|p| p.speed_ms(decimals)).collect();
    let sprays: Vec<f64> = points.iter().filter_map(|p| p.spray_rate).collect();

    TelemetrySummary {
        heading_avg: average(&headings).map(|v| round_to(v, decimals)),
        heading_min: minimum(&headings).map(|v| round_to(v, decimals)),
        heading_max: maximum(&headings).map(|v| round_to(v, decimals)),
        speed_avg_ms: average(&speeds).map(|v| round_to(v, decimals)),
        speed_min_ms: minimum(&speeds).map(|v| round_to(v, decimals)),
        speed_max_ms: maximum(&speeds).map(|v| round_to(v, decimals)),
        spray_rate_avg: average(&sprays).map(|v| round_to(v, decimals)),
        spray_rate_min: minimum(&sprays).map(|v| round_to(v, decimals)),
        spray_rate_max: maximum(&sprays).map(|v| round_to(v, decimals)),
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn minimum(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn maximum(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}
