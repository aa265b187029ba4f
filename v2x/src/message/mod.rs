// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Messages exchanged between nodes.
//!
//! Messages are logical records, not wire frames. Their JSON form mirrors the field names
//! used on the air interface of the application layer, e.g.
//! `{"msg_type": "DEN", "node": 5, "event": {...}}`.

pub mod den;
pub mod ivim;
pub mod spat;

use crate::error::Error;
use crate::topology::{Heading, Location, NodeId};
use den::HazardEvent;
use ivim::Situation;
use serde::{Deserialize, Serialize};
use spat::Intersection;
use std::fmt::Display;

/// Message type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    Den,
    Ivim,
    Spat,
    Ca,
}

impl Display for MsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgType::Den => write!(f, "DEN"),
            MsgType::Ivim => write!(f, "IVIM"),
            MsgType::Spat => write!(f, "SPAT"),
            MsgType::Ca => write!(f, "CA"),
        }
    }
}

/// Cooperative awareness content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Awareness {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub heading: Option<Heading>,
    #[serde(default)]
    pub speed: f64,
}

/// Typed message content
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Den { event: HazardEvent },
    Ivim { situation: Situation },
    Spat { intersection: Intersection },
    Ca(Awareness),
}

/// A message together with its originating node
///
/// The type tag is derived from the payload, so both can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct Envelope {
    pub origin_node: NodeId,
    pub payload: Payload,
}

/// Flat JSON form of an [Envelope]
#[derive(Serialize, Deserialize)]
struct Record {
    msg_type: String,
    node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event: Option<HazardEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    situation: Option<Situation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intersection: Option<Intersection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    awareness: Option<Awareness>,
}

impl TryFrom<Record> for Envelope {
    type Error = String;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let Record {
            msg_type,
            node,
            event,
            situation,
            intersection,
            awareness,
        } = record;
        let payload = match msg_type.as_str() {
            "DEN" => Payload::Den {
                event: event.ok_or("DEN record without event")?,
            },
            "IVIM" => Payload::Ivim {
                situation: situation.ok_or("IVIM record without situation")?,
            },
            "SPAT" => Payload::Spat {
                intersection: intersection.ok_or("SPAT record without intersection")?,
            },
            "CA" => Payload::Ca(awareness.unwrap_or_default()),
            other => return Err(format!("unknown message type '{other}'")),
        };
        Ok(Envelope::new(node, payload))
    }
}

impl From<Envelope> for Record {
    fn from(envelope: Envelope) -> Self {
        let msg_type = envelope.msg_type().to_string();
        let mut record = Record {
            msg_type,
            node: envelope.origin_node,
            event: None,
            situation: None,
            intersection: None,
            awareness: None,
        };
        match envelope.payload {
            Payload::Den { event } => record.event = Some(event),
            Payload::Ivim { situation } => record.situation = Some(situation),
            Payload::Spat { intersection } => record.intersection = Some(intersection),
            Payload::Ca(awareness) => record.awareness = Some(awareness),
        }
        record
    }
}

impl Envelope {
    pub fn new(origin_node: NodeId, payload: Payload) -> Self {
        Self {
            origin_node,
            payload,
        }
    }

    pub fn den(origin_node: NodeId, event: HazardEvent) -> Self {
        Self::new(origin_node, Payload::Den { event })
    }

    pub fn ivim(origin_node: NodeId, situation: Situation) -> Self {
        Self::new(origin_node, Payload::Ivim { situation })
    }

    pub fn spat(origin_node: NodeId, intersection: Intersection) -> Self {
        Self::new(origin_node, Payload::Spat { intersection })
    }

    pub fn ca(origin_node: NodeId, awareness: Awareness) -> Self {
        Self::new(origin_node, Payload::Ca(awareness))
    }

    pub fn msg_type(&self) -> MsgType {
        match self.payload {
            Payload::Den { .. } => MsgType::Den,
            Payload::Ivim { .. } => MsgType::Ivim,
            Payload::Spat { .. } => MsgType::Spat,
            Payload::Ca(_) => MsgType::Ca,
        }
    }

    /// Decode a logical JSON record. Optional fields fall back to safe defaults;
    /// missing required fields or an unknown type tag yield [Error::Malformed].
    pub fn from_json(json: &str) -> Result<Envelope, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {}", self.msg_type(), self.origin_node)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::den::EventType;

    #[test]
    fn decode_den_record() {
        let json = r#"{
            "msg_type": "DEN",
            "node": 5,
            "event": {
                "event_type": "road_surface_hazard",
                "hazard_subtype": "flooding",
                "severity": 4,
                "confidence": 0.7,
                "location": {"x": 1000.0, "y": 100.0},
                "dimensions": {"depth": 100.0}
            }
        }"#;
        let envelope = Envelope::from_json(json).unwrap();
        assert_eq!(envelope.msg_type(), MsgType::Den);
        assert_eq!(envelope.origin_node, NodeId(5));
        let Payload::Den { event } = envelope.payload else {
            panic!("expected DEN payload");
        };
        assert_eq!(event.event_type, EventType::RoadSurfaceHazard);
        assert_eq!(event.dimensions["depth"], 100.0);
    }

    #[test]
    fn decode_den_record_with_string_node_id() {
        let json = r#"{
            "msg_type": "DEN",
            "node": "5",
            "event": {
                "event_type": "road_surface_hazard",
                "severity": 2,
                "confidence": 0.4,
                "location": {"x": 1000.0, "y": 100.0},
                "reporting_nodes": ["5"]
            }
        }"#;
        let envelope = Envelope::from_json(json).unwrap();
        assert_eq!(envelope.origin_node, NodeId(5));
        let Payload::Den { event } = &envelope.payload else {
            panic!("expected DEN payload");
        };
        assert!(event.reporting_nodes.contains(&NodeId(5)));
        // Encoding always uses the numeric form
        assert!(envelope.to_json().unwrap().contains("\"node\":5"));
    }

    #[test]
    fn decode_spat_record_with_numeric_keys() {
        let json = r#"{
            "msg_type": "SPAT",
            "node": 2,
            "intersection": {
                "signalGroups": {"1": {"state": "red", "start": 0, "end": 1}},
                "movement": {"1": {"direction": "S", "pedestrian_detection": true}}
            }
        }"#;
        let envelope = Envelope::from_json(json).unwrap();
        let Payload::Spat { intersection } = envelope.payload else {
            panic!("expected SPAT payload");
        };
        assert_eq!(intersection.signal_groups.len(), 1);
        assert_eq!(intersection.movement[&1].direction, Heading::South);
    }

    #[test]
    fn den_without_event_is_malformed() {
        let json = r#"{"msg_type": "DEN", "node": 5}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let json = r#"{"msg_type": "MAP", "node": 1}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn ivim_record_survives_json() {
        let situation =
            ivim::ManualSituation::WeatherCondition.situation(Location::new(0.0, 600.0));
        let envelope = Envelope::ivim(NodeId(2), situation);
        let json = envelope.to_json().unwrap();
        assert!(json.contains("\"msg_type\":\"IVIM\""));
        assert_eq!(Envelope::from_json(&json).unwrap(), envelope);
    }
}
