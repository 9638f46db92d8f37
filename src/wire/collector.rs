//! # Recursive Field Collector
//!
//! Harvests every plausible scalar from a record buffer without a schema.
//!
//! The collector walks the buffer as a flat tag/value stream and, for each
//! length-delimited span, both records it as text (when it looks like
//! text) and re-parses its bytes as a nested message. Values land in
//! buckets keyed by nesting depth and field key, in encounter order, so a
//! value's position inside its bucket is its occurrence index. Downstream
//! stages pair buckets by that index; nothing here may ever skip or
//! reorder a kept value.
//!
//! Malformed input is expected, not exceptional. Any read that cannot
//! complete stops the scan of the current span only; values already
//! collected, including those from sibling and parent spans, are kept.

use std::collections::HashMap;

use tracing::debug;

use crate::wire::protocol::{
    BucketKey, FieldKey, WireType, FLOAT_DISCARD_MAGNITUDE, VARINT_DISCARD_THRESHOLD,
};
use crate::wire::reader::{read_fixed32, read_fixed64, read_tag, read_varint};

/// Collected value buckets for one record buffer.
///
/// Numeric buckets hold every guarded sample in encounter order. String
/// buckets hold the text interpretation of length-delimited spans that
/// decoded as printable UTF-8; the same span's bytes are still re-parsed
/// as a submessage, so the two maps can describe overlapping bytes.
#[derive(Debug, Clone, Default)]
pub struct BucketMap {
    numeric: HashMap<BucketKey, Vec<f64>>,
    strings: HashMap<(u8, u64), Vec<String>>,
}

impl BucketMap {
    /// Values of the numeric bucket at `(depth, key)`, if any were collected.
    pub fn numeric_bucket(&self, depth: u8, key: FieldKey) -> Option<&[f64]> {
        self.numeric
            .get(&BucketKey::new(depth, key))
            .map(Vec::as_slice)
    }

    /// Strings collected for `field` at `depth`, if any.
    pub fn string_bucket(&self, depth: u8, field: u64) -> Option<&[String]> {
        self.strings.get(&(depth, field)).map(Vec::as_slice)
    }

    /// Number of distinct numeric buckets.
    #[must_use]
    pub fn numeric_len(&self) -> usize {
        self.numeric.len()
    }

    /// Number of distinct string buckets.
    #[must_use]
    pub fn string_len(&self) -> usize {
        self.strings.len()
    }

    /// True when nothing at all was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.strings.is_empty()
    }

    fn record_numeric(&mut self, depth: u8, key: FieldKey, value: f64) {
        self.numeric
            .entry(BucketKey::new(depth, key))
            .or_default()
            .push(value);
    }

    fn record_string(&mut self, depth: u8, field: u64, text: String) {
        self.strings.entry((depth, field)).or_default().push(text);
    }
}

/// Walks record buffers and collects scalar buckets up to a depth limit.
#[derive(Debug, Clone, Copy)]
pub struct FieldCollector {
    max_depth: u8,
}

impl FieldCollector {
    /// Creates a collector that descends through depths 0 to `max_depth`.
    #[must_use]
    pub fn new(max_depth: u8) -> Self {
        Self { max_depth }
    }

    /// Collect every guarded scalar in `buf` into buckets.
    ///
    /// Never fails: a buffer of garbage simply yields empty or sparse
    /// buckets.
    pub fn collect(&self, buf: &[u8]) -> BucketMap {
        let mut buckets = BucketMap::default();
        self.walk(buf, 0, &mut buckets);
        debug!(
            numeric = buckets.numeric_len(),
            strings = buckets.string_len(),
            "collected value buckets"
        );
        buckets
    }

    fn walk(&self, buf: &[u8], depth: u8, buckets: &mut BucketMap) {
        let mut pos = 0usize;
        while pos < buf.len() {
            let Some((field, wire_bits, after_tag)) = read_tag(buf, pos) else {
                break;
            };
            // A tag with no bytes after it carries no value
            if after_tag >= buf.len() {
                break;
            }
            pos = after_tag;

            let Some(wire) = WireType::from_tag_bits(wire_bits) else {
                // Unknown width: resynchronizing is impossible, stop this span
                break;
            };

            match wire {
                WireType::Varint => {
                    let Some((raw, next)) = read_varint(buf, pos) else {
                        break;
                    };
                    pos = next;
                    let value = raw as f64;
                    if value < VARINT_DISCARD_THRESHOLD {
                        buckets.record_numeric(depth, FieldKey::int(field), value);
                    }
                }
                WireType::Fixed64 => {
                    if let Some((value, _)) = read_fixed64(buf, pos) {
                        if value.abs() < FLOAT_DISCARD_MAGNITUDE {
                            buckets.record_numeric(depth, FieldKey::dbl(field), value);
                        }
                    }
                    pos += 8;
                }
                WireType::Fixed32 => {
                    if let Some((value, _)) = read_fixed32(buf, pos) {
                        if value.abs() < FLOAT_DISCARD_MAGNITUDE {
                            buckets.record_numeric(depth, FieldKey::flt(field), value);
                        }
                    }
                    pos += 4;
                }
                WireType::LengthDelimited => {
                    let Some((length, next)) = read_varint(buf, pos) else {
                        break;
                    };
                    pos = next;

                    // Zero-length and overrunning spans end the current scan
                    if length == 0 {
                        break;
                    }
                    // A length beyond the pointer width is an overrun, not
                    // a wrapped small span
                    let Some(end) = usize::try_from(length)
                        .ok()
                        .and_then(|len| pos.checked_add(len))
                    else {
                        break;
                    };
                    if end > buf.len() {
                        break;
                    }

                    let span = &buf[pos..end];
                    if let Some(text) = printable_str(span) {
                        buckets.record_string(depth, field, text.to_string());
                    }
                    // Spans below the depth limit are also tried as nested
                    // messages; garbage inside affects only that span's own
                    // scan. Spans at the limit are consumed without descent,
                    // which keeps the depth counter inside 0..=max_depth.
                    if depth < self.max_depth {
                        self.walk(span, depth + 1, buckets);
                    }
                    pos = end;
                }
            }
        }
    }
}

/// Text interpretation of a span: valid UTF-8 with no control characters
/// and no whitespace beyond `\n`, `\r`, `\t` and the ASCII space.
fn printable_str(span: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(span).ok()?;
    let ok = text.chars().all(|c| {
        matches!(c, '\n' | '\r' | '\t' | ' ') || (!c.is_control() && !c.is_whitespace())
    });
    ok.then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::protocol::DEFAULT_MAX_DEPTH;
    use crate::wire::testutil::{
        put_double_field, put_float_field, put_int_field, put_message_field, put_str_field,
        put_tag, put_varint,
    };

    fn collector() -> FieldCollector {
        FieldCollector::new(DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn test_empty_buffer_yields_empty_buckets() {
        let buckets = collector().collect(&[]);
        assert!(buckets.is_empty());
        assert_eq!(buckets.numeric_len(), 0);
    }

    #[test]
    fn test_collects_root_scalars() {
        let mut buf = Vec::new();
        put_int_field(&mut buf, 10, 303);
        put_double_field(&mut buf, 1, -25.5);
        put_float_field(&mut buf, 3, 4.25);

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::int(10)), Some(&[303.0][..]));
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[-25.5][..]));
        assert_eq!(buckets.numeric_bucket(0, FieldKey::flt(3)), Some(&[4.25][..]));
    }

    #[test]
    fn test_repeated_fields_keep_encounter_order() {
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 1.0);
        put_double_field(&mut buf, 1, 2.0);
        put_double_field(&mut buf, 1, 3.0);

        let buckets = collector().collect(&buf);
        assert_eq!(
            buckets.numeric_bucket(0, FieldKey::dbl(1)),
            Some(&[1.0, 2.0, 3.0][..])
        );
    }

    #[test]
    fn test_nested_values_land_at_their_depth() {
        let mut inner = Vec::new();
        put_double_field(&mut inner, 1, -25.1);

        let mut middle = Vec::new();
        put_message_field(&mut middle, 1, &inner);
        put_int_field(&mut middle, 10, 7);

        let mut root = Vec::new();
        put_message_field(&mut root, 1, &middle);

        let buckets = collector().collect(&root);
        assert_eq!(buckets.numeric_bucket(2, FieldKey::dbl(1)), Some(&[-25.1][..]));
        assert_eq!(buckets.numeric_bucket(1, FieldKey::int(10)), Some(&[7.0][..]));
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), None);
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        // Nest one double 4 levels deep, then collect with max_depth 2
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 9.0);
        for _ in 0..4 {
            let mut outer = Vec::new();
            put_message_field(&mut outer, 1, &buf);
            buf = outer;
        }

        let deep = FieldCollector::new(2).collect(&buf);
        assert!(deep.numeric_bucket(4, FieldKey::dbl(1)).is_none());
        assert!(deep.is_empty());

        let full = collector().collect(&buf);
        assert_eq!(full.numeric_bucket(4, FieldKey::dbl(1)), Some(&[9.0][..]));
    }

    #[test]
    fn test_nesting_past_max_depth_255_is_safe() {
        // The widest possible limit walks the deepest countable level and
        // consumes anything below it without touching the depth counter
        let mut buf = Vec::new();
        put_int_field(&mut buf, 1, 7);
        for _ in 0..255 {
            let mut outer = Vec::new();
            put_message_field(&mut outer, 1, &buf);
            buf = outer;
        }

        let buckets = FieldCollector::new(u8::MAX).collect(&buf);
        assert_eq!(buckets.numeric_bucket(255, FieldKey::int(1)), Some(&[7.0][..]));

        // One more wrapper pushes the value past depth 255; the walk must
        // still finish and simply not record it
        let mut outer = Vec::new();
        put_message_field(&mut outer, 1, &buf);
        let buckets = FieldCollector::new(u8::MAX).collect(&outer);
        assert_eq!(buckets.numeric_len(), 0);
    }

    #[test]
    fn test_varint_magnitude_guard() {
        let mut buf = Vec::new();
        put_int_field(&mut buf, 1, 999_999_999_999_999); // just under 1e15
        put_int_field(&mut buf, 1, 1_000_000_000_000_000); // exactly 1e15
        put_int_field(&mut buf, 2, u64::MAX);

        let buckets = collector().collect(&buf);
        assert_eq!(
            buckets.numeric_bucket(0, FieldKey::int(1)),
            Some(&[999_999_999_999_999.0][..])
        );
        assert_eq!(buckets.numeric_bucket(0, FieldKey::int(2)), None);
    }

    #[test]
    fn test_float_magnitude_guard() {
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 9.9e9);
        put_double_field(&mut buf, 1, 1e10);
        put_double_field(&mut buf, 1, -1e10);
        put_double_field(&mut buf, 2, f64::NAN);
        put_double_field(&mut buf, 2, f64::INFINITY);
        put_float_field(&mut buf, 3, f32::NEG_INFINITY);

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[9.9e9][..]));
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(2)), None);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::flt(3)), None);
    }

    #[test]
    fn test_printable_span_recorded_as_string() {
        let mut buf = Vec::new();
        put_str_field(&mut buf, 5, "FLIGHT-2024");

        let buckets = collector().collect(&buf);
        let strings = buckets.string_bucket(0, 5).unwrap();
        assert_eq!(strings, &["FLIGHT-2024".to_string()][..]);
    }

    #[test]
    fn test_binary_span_not_recorded_as_string() {
        let mut buf = Vec::new();
        put_message_field(&mut buf, 5, &[0x00, 0x01, 0x02]);

        let buckets = collector().collect(&buf);
        assert!(buckets.string_bucket(0, 5).is_none());
    }

    #[test]
    fn test_exotic_whitespace_not_recorded_as_string() {
        // U+2028 LINE SEPARATOR and U+00A0 NO-BREAK SPACE are text noise;
        // only \n \r \t and the ASCII space pass as whitespace
        let mut buf = Vec::new();
        put_str_field(&mut buf, 5, "FL\u{2028}42");
        put_str_field(&mut buf, 6, "FL\u{a0}42");
        put_str_field(&mut buf, 7, "FL 42");

        let buckets = collector().collect(&buf);
        assert!(buckets.string_bucket(0, 5).is_none());
        assert!(buckets.string_bucket(0, 6).is_none());
        assert_eq!(buckets.string_bucket(0, 7).unwrap(), &["FL 42".to_string()][..]);
    }

    #[test]
    fn test_span_gets_both_interpretations() {
        // "(4" = [0x28, 0x34] is printable text and also decodes as
        // field 5, varint 52
        let mut buf = Vec::new();
        put_message_field(&mut buf, 7, b"(4");

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.string_bucket(0, 7).unwrap(), &["(4".to_string()][..]);
        assert_eq!(buckets.numeric_bucket(1, FieldKey::int(5)), Some(&[52.0][..]));
    }

    #[test]
    fn test_zero_length_span_stops_current_scan() {
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 1.5);
        put_message_field(&mut buf, 2, &[]); // length 0
        put_double_field(&mut buf, 1, 2.5); // unreachable

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[1.5][..]));
    }

    #[test]
    fn test_overrunning_span_stops_current_scan() {
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 1.5);
        put_tag(&mut buf, 2, 2);
        put_varint(&mut buf, 1000); // claims far more bytes than remain
        buf.push(0xAA);

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[1.5][..]));
        assert_eq!(buckets.numeric_len(), 1);
    }

    #[test]
    fn test_giant_span_length_stops_current_scan() {
        // A length past the pointer width reads as an overrun on every
        // target, never as a wrapped small span that parses
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 1.5);
        put_tag(&mut buf, 2, 2);
        put_varint(&mut buf, (1u64 << 32) + 5);
        buf.extend_from_slice(&[0xAA; 8]);

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[1.5][..]));
        assert_eq!(buckets.numeric_len(), 1);
    }

    #[test]
    fn test_unsupported_wire_type_stops_current_scan() {
        let mut buf = Vec::new();
        put_double_field(&mut buf, 1, 1.5);
        put_tag(&mut buf, 2, 3); // deprecated group marker
        put_double_field(&mut buf, 1, 2.5);

        let buckets = collector().collect(&buf);
        assert_eq!(buckets.numeric_bucket(0, FieldKey::dbl(1)), Some(&[1.5][..]));
    }

    #[test]
    fn test_garbage_inside_span_keeps_outer_values() {
        let mut root = Vec::new();
        put_double_field(&mut root, 1, 1.0);
        put_message_field(&mut root, 2, &[0xFF, 0xFF, 0xFF]); // truncated varints inside
        put_double_field(&mut root, 1, 2.0);

        let buckets = collector().collect(&root);
        assert_eq!(
            buckets.numeric_bucket(0, FieldKey::dbl(1)),
            Some(&[1.0, 2.0][..])
        );
    }

    #[test]
    fn test_every_truncation_is_safe() {
        // A realistic nested buffer, cut at every possible length; none of
        // the prefixes may panic, and values are a prefix of the full set
        let mut inner = Vec::new();
        put_double_field(&mut inner, 1, -25.094_079);
        put_double_field(&mut inner, 2, -48.903_534);
        put_float_field(&mut inner, 3, 4.5);
        put_int_field(&mut inner, 10, 303);

        let mut root = Vec::new();
        put_message_field(&mut root, 1, &inner);
        put_str_field(&mut root, 2, "ok");

        for cut in 0..=root.len() {
            let buckets = collector().collect(&root[..cut]);
            assert!(buckets.numeric_len() <= 4);
        }
    }

    #[test]
    fn test_trailing_truncated_varint_keeps_partial_value() {
        let mut buf = Vec::new();
        put_tag(&mut buf, 1, 0);
        buf.push(0xAC); // continuation bit set, no next byte

        let buckets = collector().collect(&buf);
        // The 7 low bits (0x2C = 44) are kept
        assert_eq!(buckets.numeric_bucket(0, FieldKey::int(1)), Some(&[44.0][..]));
    }
}
