// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Decentralized environmental notification content

use crate::topology::{Location, NodeId};
use serde::de::{value, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use uuid::Uuid;

/// Lowest severity on the 1-5 scale
pub const MIN_SEVERITY: u8 = 1;
/// Highest severity on the 1-5 scale
pub const MAX_SEVERITY: u8 = 5;

/// Kind of hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RoadSurfaceHazard,
    VehicleBreakdown,
    WeatherHazard,
    TrafficCondition,
    #[serde(alias = "road_works")]
    Roadworks,
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventType::RoadSurfaceHazard => "road_surface_hazard",
            EventType::VehicleBreakdown => "vehicle_breakdown",
            EventType::WeatherHazard => "weather_hazard",
            EventType::TrafficCondition => "traffic_condition",
            EventType::Roadworks => "roadworks",
        };
        write!(f, "{name}")
    }
}

/// Refinement of the hazard kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardSubtype {
    Potholes,
    Flooding,
    Ice,
    Debris,
    OilSpill,
    Fog,
    Hail,
    Accident,
}

impl Display for HazardSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HazardSubtype::Potholes => "potholes",
            HazardSubtype::Flooding => "flooding",
            HazardSubtype::Ice => "ice",
            HazardSubtype::Debris => "debris",
            HazardSubtype::OilSpill => "oil_spill",
            HazardSubtype::Fog => "fog",
            HazardSubtype::Hail => "hail",
            HazardSubtype::Accident => "accident",
        };
        write!(f, "{name}")
    }
}

/// Decode an optional subtype, treating names this node does not know as unknown
pub(crate) fn lenient_subtype<'de, D>(deserializer: D) -> Result<Option<HazardSubtype>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(name) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let subtype: Result<HazardSubtype, value::Error> =
        HazardSubtype::deserialize(name.as_str().into_deserializer());
    Ok(subtype.ok())
}

/// Display helper printing a missing subtype as "unknown"
pub struct SubtypeName(pub Option<HazardSubtype>);

impl Display for SubtypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(subtype) => subtype.fmt(f),
            None => write!(f, "unknown"),
        }
    }
}

/// Lifecycle stage announced by the originator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Start,
    Update,
    Stop,
}

/// A hazard as reported by a vehicle, or the canonical copy kept by an RSU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardEvent {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    pub event_type: EventType,
    #[serde(default, deserialize_with = "lenient_subtype")]
    pub hazard_subtype: Option<HazardSubtype>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default)]
    pub confidence: f64,
    pub location: Location,
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
    #[serde(default)]
    pub reporting_nodes: BTreeSet<NodeId>,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u32,
}

fn default_severity() -> u8 {
    MIN_SEVERITY
}

fn default_max_hops() -> u32 {
    8
}

fn default_max_latency_ms() -> u32 {
    10_000
}

impl HazardEvent {
    /// Create a fresh hazard with a new random event id
    pub fn new(event_type: EventType, location: Location) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            hazard_subtype: None,
            status: EventStatus::Start,
            severity: MIN_SEVERITY,
            confidence: 0.0,
            location,
            dimensions: BTreeMap::new(),
            reporting_nodes: BTreeSet::new(),
            timestamp: 0.0,
            max_hops: default_max_hops(),
            max_latency_ms: default_max_latency_ms(),
        }
    }

    pub fn subtype(mut self, subtype: Option<HazardSubtype>) -> Self {
        self.hazard_subtype = subtype;
        self
    }

    /// Set the severity, clamped to the 1-5 scale
    pub fn severity(mut self, severity: u8) -> Self {
        self.severity = severity.clamp(MIN_SEVERITY, MAX_SEVERITY);
        self
    }

    /// Set the confidence, clamped to [0, 1]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn dimension(mut self, name: &str, value: f64) -> Self {
        self.dimensions.insert(name.to_owned(), value);
        self
    }

    pub fn reported_by(mut self, node: NodeId) -> Self {
        self.reporting_nodes.insert(node);
        self
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Bring severity and confidence back into their ranges
    pub fn normalize(&mut self) {
        self.severity = self.severity.clamp(MIN_SEVERITY, MAX_SEVERITY);
        self.confidence = clamp_confidence(self.confidence);
    }
}

/// Clamp to [0, 1]; NaN counts as no confidence at all
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
