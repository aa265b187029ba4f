// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Static map of the demo corridor: four signalled intersections and six vehicles

use std::collections::BTreeMap;
use v2x::message::spat::{LightState, Movement, SignalGroup};
use v2x::topology::{Heading, Location, NodeId, NodeInterface, NodeKind};

/// Radio range of roadside units
pub const RSU_RANGE: f64 = 4000.0;
/// Radio range of vehicles
pub const OBU_RANGE: f64 = 3000.0;
/// Radio range of application units
pub const AU_RANGE: f64 = 1000.0;

pub fn range(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Rsu => RSU_RANGE,
        NodeKind::Obu => OBU_RANGE,
        NodeKind::Au => AU_RANGE,
    }
}

fn intersection(
    id: u32,
    location: Location,
    groups: &[(LightState, Heading, bool)],
) -> NodeInterface {
    let mut signal_groups = BTreeMap::new();
    let mut movement = BTreeMap::new();
    for (i, (state, direction, pedestrian_detection)) in groups.iter().enumerate() {
        let group = i as u32 + 1;
        signal_groups.insert(group, SignalGroup::new(*state));
        movement.insert(
            group,
            Movement {
                direction: *direction,
                pedestrian_detection: *pedestrian_detection,
            },
        );
    }
    NodeInterface::rsu(
        NodeId(id),
        "tls",
        location,
        Some((signal_groups, movement)),
    )
}

/// Nodes of the corridor
pub fn corridor() -> Vec<NodeInterface> {
    use Heading::*;
    use LightState::*;

    vec![
        intersection(1, Location::new(1000.0, 0.0), &[(Red, South, false)]),
        intersection(
            2,
            Location::new(0.0, 600.0),
            &[(Red, South, true), (Green, North, true)],
        ),
        intersection(
            3,
            Location::new(-600.0, 0.0),
            &[(Red, East, true), (Red, West, true)],
        ),
        intersection(
            4,
            Location::new(0.0, 0.0),
            &[
                (Red, East, true),
                (Red, West, true),
                (Yellow, North, false),
                (Yellow, South, false),
            ],
        ),
        NodeInterface::obu(NodeId(5), "car", Location::new(1000.0, 100.0), South),
        NodeInterface::obu(NodeId(6), "car", Location::new(25.0, 200.0), South),
        NodeInterface::obu(NodeId(7), "car", Location::new(25.0, -200.0), North),
        NodeInterface::obu(NodeId(8), "emergency", Location::new(1000.0, 25.0), West),
        NodeInterface::obu(NodeId(9), "car", Location::new(900.0, 25.0), West),
        NodeInterface::obu(NodeId(10), "car", Location::new(-1000.0, -25.0), East),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use v2x::rsu::signal::{CyclicPhases, SignalController, Strategy};

    #[test]
    fn intersections_select_expected_strategies() {
        let strategies: Vec<_> = corridor()
            .iter()
            .filter(|n| n.kind == NodeKind::Rsu)
            .map(|n| {
                SignalController::from_interface(n, Box::new(CyclicPhases::new(5.0)))
                    .unwrap()
                    .unwrap()
                    .strategy()
            })
            .collect();
        assert_eq!(
            strategies,
            vec![
                Strategy::SingleLane,
                Strategy::Independent,
                Strategy::Synchronized,
                Strategy::Junction
            ]
        );
    }
}
