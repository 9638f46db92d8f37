//! # GeoJSON Export
//!
//! Serializes decoded flight data as an RFC 7946 FeatureCollection.
//!
//! ## Structure
//!
//! - One `LineString` feature first, carrying the whole track
//! - One `Point` feature per GPS point with its telemetry as properties
//! - Collection-level `properties` with the point count, track bounds,
//!   telemetry statistics, mission parameters, and any caller metadata
//!
//! Geometry coordinates are `[longitude, latitude]` pairs, rounded to the
//! configured coordinate precision. Caller metadata is merged into the
//! collection properties untouched, except that the computed keys
//! (`total_points`, `gps`, `telemetry`, `mission`) win collisions.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::flight::data::{round_to, FlightData, GpsPoint};

/// Builds GeoJSON FeatureCollections from decoded flight data.
#[derive(Debug, Clone, Copy)]
pub struct GeoJsonExporter {
    coordinate_decimals: u32,
    telemetry_decimals: u32,
}

impl GeoJsonExporter {
    /// Creates an exporter with the given rounding precisions.
    #[must_use]
    pub fn new(coordinate_decimals: u32, telemetry_decimals: u32) -> Self {
        Self {
            coordinate_decimals,
            telemetry_decimals,
        }
    }

    /// Renders `flight` as a FeatureCollection value.
    ///
    /// `metadata` keys are merged into the collection properties as-is.
    /// An empty flight still renders: the LineString is empty, no Point
    /// features follow, and `total_points` is 0.
    pub fn to_feature_collection(
        &self,
        flight: &FlightData,
        metadata: Option<&Map<String, Value>>,
    ) -> Value {
        let mut features = Vec::with_capacity(flight.points.len() + 1);
        features.push(self.route_feature(flight));
        for point in &flight.points {
            features.push(self.point_feature(point));
        }

        json!({
            "type": "FeatureCollection",
            "properties": self.collection_properties(flight, metadata),
            "features": features,
        })
    }

    fn collection_properties(
        &self,
        flight: &FlightData,
        metadata: Option<&Map<String, Value>>,
    ) -> Map<String, Value> {
        let mut properties = Map::new();
        if let Some(meta) = metadata {
            for (key, value) in meta {
                properties.insert(key.clone(), value.clone());
            }
        }

        insert_computed(&mut properties, "total_points", json!(flight.total_points()));

        if let Some(bounds) = &flight.bounds {
            insert_computed(
                &mut properties,
                "gps",
                json!({
                    "lat_min": bounds.lat_min,
                    "lat_max": bounds.lat_max,
                    "lon_min": bounds.lon_min,
                    "lon_max": bounds.lon_max,
                    "center_lat": bounds.center_lat(),
                    "center_lon": bounds.center_lon(),
                }),
            );
        }

        if let Some(summary) = &flight.summary {
            insert_computed(&mut properties, "telemetry", json!(summary));
        }

        if let Some(mission) = &flight.mission {
            insert_computed(&mut properties, "mission", json!(mission));
        }

        properties
    }

    fn route_feature(&self, flight: &FlightData) -> Value {
        let coordinates: Vec<[f64; 2]> = flight
            .points
            .iter()
            .map(|point| self.coordinate_pair(point))
            .collect();

        json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
            "properties": {
                "type": "flight_path",
                "total_points": flight.total_points(),
            },
        })
    }

    fn point_feature(&self, point: &GpsPoint) -> Value {
        let [lon, lat] = self.coordinate_pair(point);

        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [lon, lat],
            },
            "properties": {
                "index": point.index,
                "latitude": lat,
                "longitude": lon,
                "heading": point.heading,
                "velocity_x": point.velocity_x,
                "velocity_y": point.velocity_y,
                "spray_rate": point.spray_rate,
                "speed_ms": point.speed_ms(self.telemetry_decimals),
            },
        })
    }

    /// GeoJSON axis order: longitude first.
    fn coordinate_pair(&self, point: &GpsPoint) -> [f64; 2] {
        [
            round_to(point.longitude, self.coordinate_decimals),
            round_to(point.latitude, self.coordinate_decimals),
        ]
    }
}

/// Inserts a computed property, evicting any colliding metadata key.
fn insert_computed(properties: &mut Map<String, Value>, key: &str, value: Value) {
    if properties.insert(key.to_string(), value).is_some() {
        debug!(key, "caller metadata collided with a computed property, computed value kept");
    }
}
