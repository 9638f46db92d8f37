//! # Signal Classification Module
//!
//! Turns anonymous value buckets into named telemetry signals.
//!
//! The wire layer knows only that "field 1 at depth 3 held doubles"; this
//! module decides that those doubles are latitudes. The mapping lives in
//! an ordered rule table so that a firmware revision that rearranges
//! field numbers needs a new table, not new code.

pub mod classifier;
pub mod role;
pub mod rules;
