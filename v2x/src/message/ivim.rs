// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Infrastructure-to-vehicle information content

use super::den::{
    clamp_confidence, lenient_subtype, EventType, HazardEvent, HazardSubtype, MIN_SEVERITY,
};
use crate::topology::Location;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Situation announced by an RSU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub event_type: EventType,
    #[serde(default, deserialize_with = "lenient_subtype")]
    pub hazard_subtype: Option<HazardSubtype>,
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default)]
    pub confidence: f64,
    /// Where the situation applies, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// The aggregated hazard this situation was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_id: Option<Uuid>,
}

fn default_severity() -> u8 {
    MIN_SEVERITY
}

impl From<&HazardEvent> for Situation {
    fn from(event: &HazardEvent) -> Self {
        Self {
            event_type: event.event_type,
            hazard_subtype: event.hazard_subtype,
            severity: event.severity,
            confidence: clamp_confidence(event.confidence),
            location: Some(event.location),
            source_event_id: Some(event.event_id),
        }
    }
}

/// Situations an operator can announce by hand at an RSU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualSituation {
    VehicleStopped,
    Roadworks,
    WeatherCondition,
}

impl ManualSituation {
    /// Situation record announced at `location`
    pub fn situation(self, location: Location) -> Situation {
        let (event_type, severity) = match self {
            ManualSituation::VehicleStopped => (EventType::VehicleBreakdown, 3),
            ManualSituation::Roadworks => (EventType::Roadworks, 2),
            ManualSituation::WeatherCondition => (EventType::WeatherHazard, 2),
        };
        Situation {
            event_type,
            hazard_subtype: None,
            severity,
            confidence: 1.0,
            location: Some(location),
            source_event_id: None,
        }
    }
}

impl Display for ManualSituation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManualSituation::VehicleStopped => write!(f, "vehicle stopped"),
            ManualSituation::Roadworks => write!(f, "roadworks"),
            ManualSituation::WeatherCondition => write!(f, "weather condition"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::den::HazardSubtype;

    #[test]
    fn situation_from_hazard_keeps_provenance() {
        let event = HazardEvent::new(EventType::RoadSurfaceHazard, Location::new(3.0, 4.0))
            .subtype(Some(HazardSubtype::Flooding))
            .severity(4)
            .confidence(0.7);
        let situation = Situation::from(&event);
        assert_eq!(situation.event_type, EventType::RoadSurfaceHazard);
        assert_eq!(situation.hazard_subtype, Some(HazardSubtype::Flooding));
        assert_eq!(situation.severity, 4);
        assert_eq!(situation.location, Some(Location::new(3.0, 4.0)));
        assert_eq!(situation.source_event_id, Some(event.event_id));
    }

    #[test]
    fn unknown_subtype_does_not_drop_the_situation() {
        let json = r#"{"event_type": "road_surface_hazard", "hazard_subtype": "sinkhole",
                       "severity": 4, "confidence": 0.9}"#;
        let situation: Situation = serde_json::from_str(json).unwrap();
        assert_eq!(situation.hazard_subtype, None);
        assert_eq!(situation.severity, 4);
        assert_eq!(situation.location, None);
    }

    #[test]
    fn manual_roadworks() {
        let situation = ManualSituation::Roadworks.situation(Location::new(1000.0, 0.0));
        assert_eq!(situation.event_type, EventType::Roadworks);
        assert_eq!(situation.confidence, 1.0);
        assert_eq!(situation.location, Some(Location::new(1000.0, 0.0)));
    }
}
