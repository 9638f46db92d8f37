//! # Wire Protocol Constants and Types
//!
//! Core definitions for the schema-less protobuf-style wire format used by
//! the vendor's flight-record blobs: wire types, field keys, bucket keys,
//! and the magnitude guards that separate plausible telemetry from
//! misaligned-parse garbage.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};

use crate::error::AgFlightError;

/// Varint samples at or above this magnitude are discarded as parse noise
pub const VARINT_DISCARD_THRESHOLD: f64 = 1e15;

/// Fixed-width float samples at or beyond this magnitude are discarded
pub const FLOAT_DISCARD_MAGNITUDE: f64 = 1e10;

/// Default recursion limit for nested submessages (depths 0 through 6)
pub const DEFAULT_MAX_DEPTH: u8 = 6;

/// Wire type of a field, encoded in the low 3 bits of its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Base-128 varint value
    Varint,

    /// 8-byte little-endian value, read as an IEEE 754 double
    Fixed64,

    /// Length-prefixed span: submessage, string, or packed data
    LengthDelimited,

    /// 4-byte little-endian value, read as an IEEE 754 float
    Fixed32,
}

impl WireType {
    /// Decode the low 3 bits of a tag.
    ///
    /// Returns `None` for the deprecated group markers (3, 4) and any other
    /// unsupported encoding; the caller cannot know the width of such a
    /// field and must stop scanning the current span.
    pub fn from_tag_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

/// Scalar family of a collected sample, named after the bucket prefixes
/// used in rule files (`int_`, `dbl_`, `flt_`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    /// Varint-encoded integer
    Int,

    /// 64-bit double
    Dbl,

    /// 32-bit float, widened to f64 for storage
    Flt,
}

impl ScalarKind {
    /// Textual prefix used in field keys
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Dbl => "dbl",
            Self::Flt => "flt",
        }
    }
}

/// A scalar family paired with a field number, e.g. `dbl_1` or `int_23`.
///
/// This is the textual bucket identity rule files match on. Field numbers
/// are kept as `u64` because garbage tags in misaligned spans can decode to
/// values far outside the protobuf range, and collapsing them onto real
/// field numbers would pollute real buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    /// Scalar family
    pub kind: ScalarKind,

    /// Field number from the tag
    pub field: u64,
}

impl FieldKey {
    /// Creates a varint field key
    #[must_use]
    pub fn int(field: u64) -> Self {
        Self { kind: ScalarKind::Int, field }
    }

    /// Creates a double field key
    #[must_use]
    pub fn dbl(field: u64) -> Self {
        Self { kind: ScalarKind::Dbl, field }
    }

    /// Creates a float field key
    #[must_use]
    pub fn flt(field: u64) -> Self {
        Self { kind: ScalarKind::Flt, field }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.field)
    }
}

impl FromStr for FieldKey {
    type Err = AgFlightError;

    /// Parses keys of the form `int_N`, `dbl_N`, or `flt_N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AgFlightError::Rule(format!(
                "invalid field key '{s}': expected int_N, dbl_N, or flt_N"
            ))
        };

        let (prefix, number) = s.split_once('_').ok_or_else(invalid)?;
        let kind = match prefix {
            "int" => ScalarKind::Int,
            "dbl" => ScalarKind::Dbl,
            "flt" => ScalarKind::Flt,
            _ => return Err(invalid()),
        };
        let field: u64 = number.parse().map_err(|_| invalid())?;

        Ok(Self { kind, field })
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Identity of a numeric value bucket: where in the nesting a sample was
/// found, and what it looked like there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    /// Nesting depth the sample was collected at (root is 0)
    pub depth: u8,

    /// Scalar family and field number
    pub key: FieldKey,
}

impl BucketKey {
    /// Creates a bucket key
    #[must_use]
    pub fn new(depth: u8, key: FieldKey) -> Self {
        Self { depth, key }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} {}", self.depth, self.key)
    }
}
