// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Node descriptions handed over by the map/topology collaborator, and the plane geometry
//! used to relate hazard reports to each other.

use crate::message::spat::{Movement, SignalGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Identifies a node (RSU, OBU or AU) on the map
///
/// Serialized as a number. Decoding also accepts a numeric string such as `"5"`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawNodeId", into = "u32")]
pub struct NodeId(pub u32);

/// Node id as found in message records
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Number(u32),
    Text(String),
}

impl TryFrom<RawNodeId> for NodeId {
    type Error = String;

    fn try_from(raw: RawNodeId) -> Result<Self, Self::Error> {
        match raw {
            RawNodeId::Number(id) => Ok(NodeId(id)),
            RawNodeId::Text(text) => text
                .trim()
                .parse()
                .map(NodeId)
                .map_err(|e| format!("invalid node id '{text}': {e}")),
        }
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl NodeId {
    pub const fn new(i: u32) -> Self {
        Self(i)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Kind of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Roadside unit
    Rsu,
    /// Onboard unit
    Obu,
    /// Application unit
    Au,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Rsu => write!(f, "RSU"),
            NodeKind::Obu => write!(f, "OBU"),
            NodeKind::Au => write!(f, "AU"),
        }
    }
}

/// Compass heading of a vehicle or a signalled movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "O", alias = "W")]
    West,
}

impl Heading {
    /// Unit vector pointing along the heading
    fn unit(self) -> (f64, f64) {
        match self {
            Heading::North => (0.0, 1.0),
            Heading::South => (0.0, -1.0),
            Heading::East => (1.0, 0.0),
            Heading::West => (-1.0, 0.0),
        }
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heading::North => write!(f, "N"),
            Heading::South => write!(f, "S"),
            Heading::East => write!(f, "E"),
            Heading::West => write!(f, "W"),
        }
    }
}

/// A point on the map plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The point `distance` units ahead when travelling along `heading`.
    /// Without a heading the location itself is returned.
    pub fn project(&self, heading: Option<Heading>, distance: f64) -> Location {
        match heading {
            Some(heading) => {
                let (dx, dy) = heading.unit();
                Location::new(self.x + dx * distance, self.y + dy * distance)
            }
            None => *self,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Circular region deciding whether two reports describe the same physical event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub center: Location,
    pub radius: f64,
}

impl Zone {
    pub fn new(center: Location, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Boundary points are inside the zone
    pub fn contains(&self, location: &Location) -> bool {
        self.center.distance_to(location) <= self.radius
    }
}

/// Node description provided by the map collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInterface {
    pub node_id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub sub_type: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub heading: Option<Heading>,
    #[serde(default)]
    pub num_tls: Option<usize>,
    #[serde(default)]
    pub tls_groups: Option<BTreeMap<u32, SignalGroup>>,
    #[serde(default)]
    pub movement: Option<BTreeMap<u32, Movement>>,
}

impl NodeInterface {
    /// Describe a vehicle
    pub fn obu(node_id: NodeId, sub_type: &str, location: Location, heading: Heading) -> Self {
        Self {
            node_id,
            kind: NodeKind::Obu,
            sub_type: sub_type.to_owned(),
            x: location.x,
            y: location.y,
            heading: Some(heading),
            num_tls: None,
            tls_groups: None,
            movement: None,
        }
    }

    /// Describe a roadside unit, optionally controlling an intersection
    pub fn rsu(
        node_id: NodeId,
        sub_type: &str,
        location: Location,
        signals: Option<(BTreeMap<u32, SignalGroup>, BTreeMap<u32, Movement>)>,
    ) -> Self {
        let (num_tls, tls_groups, movement) = match signals {
            Some((groups, movement)) => (Some(groups.len()), Some(groups), Some(movement)),
            None => (None, None, None),
        };
        Self {
            node_id,
            kind: NodeKind::Rsu,
            sub_type: sub_type.to_owned(),
            x: location.x,
            y: location.y,
            heading: None,
            num_tls,
            tls_groups,
            movement,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.x, self.y)
    }
}
