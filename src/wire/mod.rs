//! # Wire Format Module
//!
//! Schema-less reading of the protobuf-style tag/value stream found in
//! captured flight-record blobs.
//!
//! This module handles:
//! - Varint and fixed-width primitive decoding
//! - Tag splitting into field number and wire type
//! - Recursive harvesting of every plausible scalar, bucketed by depth
//! - Dual text/submessage interpretation of length-delimited spans

pub mod collector;
pub mod protocol;
pub mod reader;

#[cfg(test)]
pub mod testutil;
