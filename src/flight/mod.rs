//! # Flight Module
//!
//! Everything between classified signals and finished flight data: frame
//! assembly by occurrence index, track bounds, and flight-wide telemetry
//! statistics.

pub mod aggregate;
pub mod assembler;
pub mod data;
