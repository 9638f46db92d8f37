//! # Wire Format Reader
//!
//! Cursor-based primitive decoders for the raw record bytes.
//!
//! Every reader takes a buffer and a starting position and returns the
//! decoded value together with the position after it, or `None` when not
//! enough bytes remain. Running out of bytes is the normal end-of-stream
//! signal in this format, never an error: callers stop scanning and keep
//! whatever they collected so far.

/// Decode a base-128 varint starting at `pos`.
///
/// Accumulates 7-bit groups from least to most significant until a byte
/// without the continuation bit (0x80) is seen.
///
/// Two deliberate lenient behaviors:
/// - A varint cut off by the end of the buffer yields the bits accumulated
///   so far, with the position at the buffer end. The caller notices the
///   exhaustion on its next read.
/// - Encodings wider than 64 bits saturate to `u64::MAX` instead of
///   wrapping, so downstream magnitude guards reliably reject them.
///
/// # Arguments
///
/// * `buf` - Raw record bytes
/// * `pos` - Offset of the first varint byte
///
/// # Returns
///
/// * `Some((value, new_pos))` - Decoded value and position after it
/// * `None` - `pos` is already at or past the end of the buffer
pub fn read_varint(buf: &[u8], pos: usize) -> Option<(u64, usize)> {
    if pos >= buf.len() {
        return None;
    }

    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut pos = pos;

    while pos < buf.len() {
        let byte = buf[pos];
        let group = u64::from(byte & 0x7F);

        if shift >= 64 || (shift > 57 && group >> (64 - shift) != 0) {
            // Bits past the 64-bit range; keep consuming, saturate the value
            result = u64::MAX;
        } else {
            result |= group << shift;
        }

        pos += 1;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    Some((result, pos))
}

/// Read 8 little-endian bytes at `pos` as an IEEE 754 double.
///
/// # Returns
///
/// * `Some((value, new_pos))` - Decoded double and position after it
/// * `None` - Fewer than 8 bytes remain
pub fn read_fixed64(buf: &[u8], pos: usize) -> Option<(f64, usize)> {
    let end = pos.checked_add(8)?;
    if end > buf.len() {
        return None;
    }

    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[pos..end]);
    Some((f64::from_le_bytes(raw), end))
}

/// Read 4 little-endian bytes at `pos` as an IEEE 754 float, widened to f64.
///
/// # Returns
///
/// * `Some((value, new_pos))` - Decoded float and position after it
/// * `None` - Fewer than 4 bytes remain
pub fn read_fixed32(buf: &[u8], pos: usize) -> Option<(f64, usize)> {
    let end = pos.checked_add(4)?;
    if end > buf.len() {
        return None;
    }

    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[pos..end]);
    Some((f64::from(f32::from_le_bytes(raw)), end))
}

/// Read a field tag at `pos` and split it into field number and wire-type
/// bits.
///
/// The tag is a varint whose low 3 bits carry the wire type and whose
/// remaining bits carry the field number. The raw wire-type bits are
/// returned undecoded; see [`super::protocol::WireType::from_tag_bits`].
///
/// # Returns
///
/// * `Some((field, wire_bits, new_pos))` - Split tag and position after it
/// * `None` - `pos` is already at or past the end of the buffer
pub fn read_tag(buf: &[u8], pos: usize) -> Option<(u64, u8, usize)> {
    let (tag, new_pos) = read_varint(buf, pos)?;
    let field = tag >> 3;
    let wire_bits = (tag & 0x07) as u8;
    Some((field, wire_bits, new_pos))
}
