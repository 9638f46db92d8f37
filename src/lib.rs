//! # AgFlight Library
//!
//! Recover GPS tracks and spray telemetry from the opaque binary blobs an
//! agricultural drone vendor serves for each flight record.
//!
//! The blobs use protobuf-style framing but ship no schema. This library
//! walks the raw wire format, harvests every plausible scalar into
//! buckets, assigns meaning through a configurable classification table,
//! assembles GPS tracks with per-point telemetry, and exports the result
//! as GeoJSON.

pub mod classify;
pub mod config;
pub mod decoder;
pub mod error;
pub mod flight;
pub mod geojson;
pub mod wire;
