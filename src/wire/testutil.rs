//! Test-only helpers for building synthetic wire buffers.
//!
//! Tests across the crate assemble blobs with these writers instead of
//! hand-maintaining byte arrays. They mirror the real encoding: varint
//! tags, little-endian fixed-width scalars, length-prefixed spans.

/// Append the varint encoding of `value`.
pub fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a field tag for `field` with the given wire-type bits.
pub fn put_tag(out: &mut Vec<u8>, field: u64, wire_bits: u8) {
    put_varint(out, (field << 3) | u64::from(wire_bits));
}

/// Append a varint field.
pub fn put_int_field(out: &mut Vec<u8>, field: u64, value: u64) {
    put_tag(out, field, 0);
    put_varint(out, value);
}

/// Append a fixed64 double field.
pub fn put_double_field(out: &mut Vec<u8>, field: u64, value: f64) {
    put_tag(out, field, 1);
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a fixed32 float field.
pub fn put_float_field(out: &mut Vec<u8>, field: u64, value: f32) {
    put_tag(out, field, 5);
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a length-delimited field holding `body`.
pub fn put_message_field(out: &mut Vec<u8>, field: u64, body: &[u8]) {
    put_tag(out, field, 2);
    put_varint(out, body.len() as u64);
    out.extend_from_slice(body);
}

/// Append a length-delimited field holding UTF-8 text.
pub fn put_str_field(out: &mut Vec<u8>, field: u64, text: &str) {
    put_message_field(out, field, text.as_bytes());
}
