// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Signal phase and timing content

use crate::topology::Heading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Traffic light state of one signal group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

impl LightState {
    /// Next state in the green -> yellow -> red -> green cycle
    pub fn next(self) -> LightState {
        match self {
            LightState::Green => LightState::Yellow,
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        }
    }
}

impl Display for LightState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightState::Red => write!(f, "red"),
            LightState::Yellow => write!(f, "yellow"),
            LightState::Green => write!(f, "green"),
        }
    }
}

/// One signal group of an intersection with its current phase window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalGroup {
    pub state: LightState,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}

impl SignalGroup {
    pub fn new(state: LightState) -> Self {
        Self {
            state,
            start: 0.0,
            end: 1.0,
        }
    }
}

/// Direction of travel controlled by the signal group with the same id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub direction: Heading,
    #[serde(default)]
    pub pedestrian_detection: bool,
}

/// Full intersection state as published in a SPAT
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Intersection {
    #[serde(rename = "signalGroups")]
    pub signal_groups: BTreeMap<u32, SignalGroup>,
    #[serde(default)]
    pub movement: BTreeMap<u32, Movement>,
}

impl Intersection {
    /// Light states that apply to a vehicle travelling along `heading`
    pub fn states_for(&self, heading: Heading) -> impl Iterator<Item = LightState> + '_ {
        self.movement
            .iter()
            .filter(move |(_, m)| m.direction == heading)
            .filter_map(|(id, _)| self.signal_groups.get(id).map(|g| g.state))
    }
}
