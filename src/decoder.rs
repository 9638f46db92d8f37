//! # Flight Decoder
//!
//! The pipeline facade: one validated configuration in, one `FlightData`
//! per record buffer out.
//!
//! Stages always run in the same order: collect buckets from the wire,
//! classify them against the rule table, assemble frames by occurrence
//! index, then aggregate bounds and statistics. Configuration problems
//! surface once at construction; decoding itself cannot fail, only
//! degrade to an empty result.

use tracing::debug;

use crate::classify::classifier::{classify, ClassifiedSignals};
use crate::classify::role::SignalRole;
use crate::classify::rules::RuleTable;
use crate::config::DecoderConfig;
use crate::error::Result;
use crate::flight::aggregate::{compute_bounds, compute_telemetry};
use crate::flight::assembler::assemble;
use crate::flight::data::{FlightData, MissionParameters};
use crate::geojson::GeoJsonExporter;
use crate::wire::collector::FieldCollector;

/// Decodes record blobs into flight data using one fixed configuration.
///
/// # Examples
///
/// ```
/// use agflight::config::DecoderConfig;
/// use agflight::decoder::FlightDecoder;
///
/// let decoder = FlightDecoder::new(DecoderConfig::default())?;
/// let flight = decoder.decode(&[]);
/// assert!(flight.is_empty());
/// # Ok::<(), agflight::error::AgFlightError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FlightDecoder {
    config: DecoderConfig,
    rules: RuleTable,
    exporter: GeoJsonExporter,
}

impl FlightDecoder {
    /// Creates a decoder from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration or its rule table is
    /// malformed. This is the decode surface's only failure path;
    /// [`decode`](Self::decode) itself never fails.
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.rule_table();
        let exporter = GeoJsonExporter::new(
            config.rounding.coordinate_decimals,
            config.rounding.telemetry_decimals,
        );

        Ok(Self {
            config,
            rules,
            exporter,
        })
    }

    /// Decodes one record blob.
    ///
    /// Never fails and never panics: truncated, corrupt, or empty buffers
    /// yield a flight with fewer points, down to none.
    #[must_use]
    pub fn decode(&self, buffer: &[u8]) -> FlightData {
        let collector = FieldCollector::new(self.config.decoder.max_depth);
        let buckets = collector.collect(buffer);
        let signals = classify(&buckets, &self.rules);

        let telemetry_decimals = self.config.rounding.telemetry_decimals;
        let points = assemble(&signals, telemetry_decimals);
        let bounds = compute_bounds(&points);
        let summary = compute_telemetry(&points, telemetry_decimals);
        let mission = mission_parameters(&signals);

        debug!(
            bytes = buffer.len(),
            points = points.len(),
            "decoded flight record"
        );

        FlightData {
            points,
            bounds,
            summary: Some(summary),
            mission: (!mission.is_empty()).then_some(mission),
        }
    }

    /// Renders decoded flight data as a GeoJSON FeatureCollection.
    ///
    /// `metadata` keys are merged into the collection properties; computed
    /// keys win collisions.
    pub fn to_geojson(
        &self,
        flight: &FlightData,
        metadata: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> serde_json::Value {
        self.exporter.to_feature_collection(flight, metadata)
    }

    /// The classification table in effect.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The configuration in effect.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

/// Per-flight parameters from the first occurrence of each signal.
fn mission_parameters(signals: &ClassifiedSignals) -> MissionParameters {
    MissionParameters {
        battery_percent: signals.first_value(SignalRole::BatteryPercent),
        task_speed: signals.first_value(SignalRole::TaskSpeed).map(|v| v as i64),
        mission_code: signals
            .first_value(SignalRole::MissionCode)
            .map(|v| v as i64),
    }
}
