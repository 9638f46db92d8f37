//! # Frame Assembler
//!
//! Pairs classified signal buckets back into per-point telemetry frames.
//!
//! The wire format carries no timestamps or sequence numbers; the only
//! thing tying a latitude to "its" longitude is that both were the i-th
//! value collected into their buckets. The assembler walks that shared
//! occurrence index and applies each rule's acceptance window per value:
//!
//! - Latitude and longitude are checked jointly. Both must pass for the
//!   frame to survive; a frame with one bad coordinate is dropped whole,
//!   which keeps the surviving track self-consistent.
//! - Heading, velocity and spray samples are optional per frame. An
//!   out-of-window or missing sample costs that field only, never the
//!   frame.
//!
//! Accepted frames are re-indexed 0..n with no gaps.

use tracing::debug;

use crate::classify::classifier::{ClassifiedBucket, ClassifiedSignals};
use crate::classify::role::SignalRole;
use crate::flight::data::{round_to, GpsPoint};

/// Assembles GPS frames from classified signals.
///
/// Telemetry samples are rounded to `telemetry_decimals` places as they
/// are attached. Returns an empty track when either coordinate signal is
/// missing.
pub fn assemble(signals: &ClassifiedSignals, telemetry_decimals: u32) -> Vec<GpsPoint> {
    let (Some(latitude), Some(longitude)) = (
        signals.get(SignalRole::Latitude),
        signals.get(SignalRole::Longitude),
    ) else {
        return Vec::new();
    };

    // Frames exist only where both coordinate buckets have a sample
    let candidates = latitude.len().min(longitude.len());

    let heading = signals.get(SignalRole::Heading);
    let velocity_x = signals.get(SignalRole::VelocityX);
    let velocity_y = signals.get(SignalRole::VelocityY);
    let spray_rate = signals.get(SignalRole::SprayRate);

    let mut points = Vec::with_capacity(candidates);
    for i in 0..candidates {
        let lat = latitude.values[i];
        let lon = longitude.values[i];

        // Joint check: one bad coordinate invalidates the whole frame
        if !(latitude.range.contains(lat) && longitude.range.contains(lon)) {
            continue;
        }

        points.push(GpsPoint {
            index: points.len(),
            latitude: lat,
            longitude: lon,
            heading: sample_at(heading, i, telemetry_decimals),
            velocity_x: sample_at(velocity_x, i, telemetry_decimals),
            velocity_y: sample_at(velocity_y, i, telemetry_decimals),
            spray_rate: sample_at(spray_rate, i, telemetry_decimals),
        });
    }

    debug!(
        accepted = points.len(),
        candidates, "assembled telemetry frames"
    );
    points
}

/// Sample of `bucket` at occurrence `index`: present, in window, rounded.
fn sample_at(bucket: Option<&ClassifiedBucket>, index: usize, decimals: u32) -> Option<f64> {
    let bucket = bucket?;
    let value = *bucket.values.get(index)?;
    bucket
        .range
        .contains(value)
        .then(|| round_to(value, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classifier::classify;
    use crate::classify::rules::RuleTable;
    use crate::config::BoundingBox;
    use crate::wire::collector::FieldCollector;
    use crate::wire::protocol::DEFAULT_MAX_DEPTH;
    use crate::wire::testutil::{put_double_field, put_float_field, put_message_field};

    /// Builds signals from depth-3 samples the way real records carry them.
    fn signals_from(points: &[(f64, f64, f64, f32, f32, f32)]) -> ClassifiedSignals {
        let mut depth2 = Vec::new();
        for &(lat, lon, heading, vx, vy, spray) in points {
            let mut frame = Vec::new();
            put_double_field(&mut frame, 1, lat);
            put_double_field(&mut frame, 2, lon);
            put_double_field(&mut frame, 3, heading);
            put_float_field(&mut frame, 1, vx);
            put_float_field(&mut frame, 2, vy);
            put_float_field(&mut frame, 3, spray);
            put_message_field(&mut depth2, 1, &frame);
        }

        let mut depth1 = Vec::new();
        put_message_field(&mut depth1, 1, &depth2);
        let mut root = Vec::new();
        put_message_field(&mut root, 1, &depth1);

        let buckets = FieldCollector::new(DEFAULT_MAX_DEPTH).collect(&root);
        classify(&buckets, &RuleTable::default_for(&BoundingBox::default()))
    }

    #[test]
    fn test_assembles_aligned_frames() {
        let signals = signals_from(&[
            (-25.094_079, -48.903_534, 90.0, 3.0, 4.0, 2.5),
            (-25.094_181, -48.903_633, 91.0, 3.5, 4.5, 2.6),
        ]);

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].index, 0);
        assert_eq!(points[0].latitude, -25.094_079);
        assert_eq!(points[0].longitude, -48.903_534);
        assert_eq!(points[0].heading, Some(90.0));
        assert_eq!(points[0].velocity_x, Some(3.0));
        assert_eq!(points[0].velocity_y, Some(4.0));
        assert_eq!(points[0].spray_rate, Some(2.5));

        assert_eq!(points[1].index, 1);
        assert_eq!(points[1].heading, Some(91.0));
    }

    #[test]
    fn test_frame_with_bad_latitude_dropped_whole() {
        let signals = signals_from(&[
            (-25.0, -48.0, 10.0, 1.0, 1.0, 1.0),
            (40.0, -48.1, 11.0, 1.0, 1.0, 1.0), // latitude outside the box
            (-25.2, -48.2, 12.0, 1.0, 1.0, 1.0),
        ]);

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 2);

        // Survivors are re-indexed gaplessly
        assert_eq!(points[0].index, 0);
        assert_eq!(points[0].latitude, -25.0);
        assert_eq!(points[1].index, 1);
        assert_eq!(points[1].latitude, -25.2);
        assert_eq!(points[1].heading, Some(12.0));
    }

    #[test]
    fn test_frame_with_bad_longitude_dropped_whole() {
        let signals = signals_from(&[
            (-25.0, -48.0, 10.0, 1.0, 1.0, 1.0),
            (-25.1, 10.0, 11.0, 1.0, 1.0, 1.0), // longitude outside the box
        ]);

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].longitude, -48.0);
    }

    #[test]
    fn test_out_of_window_telemetry_costs_field_not_frame() {
        let signals = signals_from(&[
            // Spray rate 55 is outside 0..50, velocity 31 outside -30..30
            (-25.0, -48.0, 10.0, 31.0, 1.0, 55.0),
        ]);

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].velocity_x, None);
        assert_eq!(points[0].velocity_y, Some(1.0));
        assert_eq!(points[0].spray_rate, None);
        assert_eq!(points[0].heading, Some(10.0));
    }

    #[test]
    fn test_duplicate_consecutive_fixes_kept() {
        // A hovering drone repeats its coordinates; both frames are real
        let signals = signals_from(&[
            (-25.0, -48.0, 10.0, 0.0, 0.0, 1.0),
            (-25.0, -48.0, 10.0, 0.0, 0.0, 1.0),
        ]);

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, points[1].latitude);
        assert_eq!(points[0].index, 0);
        assert_eq!(points[1].index, 1);
    }

    #[test]
    fn test_missing_coordinate_signal_yields_empty_track() {
        let signals = ClassifiedSignals::default();
        assert!(assemble(&signals, 2).is_empty());
    }

    #[test]
    fn test_unequal_buckets_pair_to_shorter_length() {
        // Three latitudes but only two longitudes: the trailing latitude
        // has no partner and is ignored
        let mut body = Vec::new();
        put_double_field(&mut body, 1, -25.0);
        put_double_field(&mut body, 1, -25.1);
        put_double_field(&mut body, 1, -25.2);
        put_double_field(&mut body, 2, -48.0);
        put_double_field(&mut body, 2, -48.1);

        let mut buf = body;
        for _ in 0..3 {
            let mut outer = Vec::new();
            put_message_field(&mut outer, 1, &buf);
            buf = outer;
        }

        let buckets = FieldCollector::new(DEFAULT_MAX_DEPTH).collect(&buf);
        let signals = classify(&buckets, &RuleTable::default_for(&BoundingBox::default()));

        let points = assemble(&signals, 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].latitude, -25.1);
        assert_eq!(points[1].longitude, -48.1);
    }

    #[test]
    fn test_telemetry_samples_are_rounded() {
        let signals = signals_from(&[(-25.0, -48.0, 10.125, 1.0, 1.0, 2.345_7)]);

        let points = assemble(&signals, 2);
        assert_eq!(points[0].heading, Some(10.13));
        assert_eq!(points[0].spray_rate, Some(2.35));
    }

    #[test]
    fn test_velocity_zero_is_inside_window() {
        // 0.0 velocity is strictly inside -30..30; only spray's 0.0 sits
        // on an excluded endpoint
        let signals = signals_from(&[(-25.0, -48.0, 0.0, 0.0, 0.0, 0.0)]);

        let points = assemble(&signals, 2);
        assert_eq!(points[0].velocity_x, Some(0.0));
        assert_eq!(points[0].velocity_y, Some(0.0));
        assert_eq!(points[0].spray_rate, None);
    }
}
