// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Intersection signal control
//!
//! The [SignalController] owns the intersection state of an RSU. On every phase it lets a
//! [PhaseActuator] advance the signal groups and hands back the intersection snapshot to be
//! published as exactly one SPAT.

use crate::error::Error;
use crate::message::spat::{Intersection, LightState, Movement, SignalGroup};
use crate::topology::NodeInterface;
use log::debug;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Control strategy, selected from the number of signal groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One group controlling a single lane
    SingleLane,
    /// Two groups on the same road, one per direction, sharing their state
    Synchronized,
    /// Two groups on different roads, alternating
    Independent,
    /// Four groups at a junction of two roads, alternating per road
    Junction,
}

impl Strategy {
    /// Select the strategy for `groups`
    pub fn select(groups: &BTreeMap<u32, SignalGroup>) -> Result<Strategy, Error> {
        match groups.len() {
            1 => Ok(Strategy::SingleLane),
            2 => {
                let mut states = groups.values().map(|g| g.state);
                if states.next() == states.next() {
                    Ok(Strategy::Synchronized)
                } else {
                    Ok(Strategy::Independent)
                }
            }
            4 => Ok(Strategy::Junction),
            n => Err(Error::Configuration(format!(
                "unsupported number of signal groups: {n}"
            ))),
        }
    }

    /// Partition group ids into units that always share a light state.
    /// `ids` must be sorted and match the strategy's group count.
    fn units(self, ids: &[u32]) -> Vec<Vec<u32>> {
        match self {
            Strategy::SingleLane | Strategy::Synchronized => vec![ids.to_vec()],
            Strategy::Independent => ids.iter().map(|id| vec![*id]).collect(),
            Strategy::Junction => ids.chunks(2).map(|pair| pair.to_vec()).collect(),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::SingleLane => write!(f, "single lane"),
            Strategy::Synchronized => write!(f, "synchronized lanes"),
            Strategy::Independent => write!(f, "independent lanes"),
            Strategy::Junction => write!(f, "junction"),
        }
    }
}

/// Advances the signal groups of an intersection by one phase
pub trait PhaseActuator: Send {
    fn advance(
        &mut self,
        strategy: Strategy,
        groups: &mut BTreeMap<u32, SignalGroup>,
        now: f64,
    ) -> Result<(), Error>;
}

/// Phase sequencing green -> yellow -> red -> green
///
/// All groups of a unit (every group for single and synchronized lanes, each group for
/// independent lanes, each pair for a junction) share their state. Units that are not red
/// advance; once every unit is red the unit following the last active one turns green.
#[derive(Debug, Clone, Default)]
pub struct CyclicPhases {
    phase_duration: f64,
    last_active: Option<usize>,
}

impl CyclicPhases {
    pub fn new(phase_duration: f64) -> Self {
        Self {
            phase_duration,
            last_active: None,
        }
    }
}

impl PhaseActuator for CyclicPhases {
    fn advance(
        &mut self,
        strategy: Strategy,
        groups: &mut BTreeMap<u32, SignalGroup>,
        now: f64,
    ) -> Result<(), Error> {
        let ids: Vec<u32> = groups.keys().copied().collect();
        let units = strategy.units(&ids);
        let lead = |groups: &BTreeMap<u32, SignalGroup>, unit: &[u32]| {
            unit.first()
                .and_then(|id| groups.get(id))
                .map(|g| g.state)
                .unwrap_or(LightState::Red)
        };

        let mut next = BTreeMap::new();
        for (index, unit) in units.iter().enumerate() {
            let state = lead(groups, unit);
            if state != LightState::Red {
                next.insert(index, state.next());
                self.last_active = Some(index);
            }
        }
        if next.is_empty() && !units.is_empty() {
            let index = self.last_active.map_or(0, |last| (last + 1) % units.len());
            next.insert(index, LightState::Green);
            self.last_active = Some(index);
        }

        for (index, state) in next {
            for id in &units[index] {
                if let Some(group) = groups.get_mut(id) {
                    group.state = state;
                }
            }
        }
        for group in groups.values_mut() {
            group.start = now;
            group.end = now + self.phase_duration;
        }
        Ok(())
    }
}

/// Signal controller of one intersection
pub struct SignalController {
    strategy: Strategy,
    intersection: Intersection,
    actuator: Box<dyn PhaseActuator>,
}

impl SignalController {
    pub fn new(
        groups: BTreeMap<u32, SignalGroup>,
        movement: BTreeMap<u32, Movement>,
        actuator: Box<dyn PhaseActuator>,
    ) -> Result<Self, Error> {
        let strategy = Strategy::select(&groups)?;
        debug!(
            "Signal controller with {} group(s), strategy {strategy}",
            groups.len()
        );
        Ok(Self {
            strategy,
            intersection: Intersection {
                signal_groups: groups,
                movement,
            },
            actuator,
        })
    }

    /// Controller for the intersection described by `interface`, or `None` if the node
    /// has no signal groups
    pub fn from_interface(
        interface: &NodeInterface,
        actuator: Box<dyn PhaseActuator>,
    ) -> Result<Option<Self>, Error> {
        let Some(groups) = interface.tls_groups.clone() else {
            return Ok(None);
        };
        if let Some(num_tls) = interface.num_tls {
            if num_tls != groups.len() {
                return Err(Error::Configuration(format!(
                    "node {} declares {num_tls} signal groups but describes {}",
                    interface.node_id,
                    groups.len()
                )));
            }
        }
        let movement = interface.movement.clone().unwrap_or_default();
        Self::new(groups, movement, actuator).map(Some)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// Advance one phase and return the state to publish
    ///
    /// The strategy follows the current groups: paired lanes are synchronized only while
    /// both groups share their state.
    pub fn phase(&mut self, now: f64) -> Result<Intersection, Error> {
        let groups = &mut self.intersection.signal_groups;
        self.actuator.advance(self.strategy, groups, now)?;

        let strategy = Strategy::select(groups)?;
        if strategy != self.strategy {
            debug!("Signal strategy {} -> {strategy}", self.strategy);
            self.strategy = strategy;
        }
        Ok(self.intersection.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::topology::{Heading, Location, NodeId};

    fn groups(states: &[LightState]) -> BTreeMap<u32, SignalGroup> {
        states
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u32 + 1, SignalGroup::new(*s)))
            .collect()
    }

    fn states(intersection: &Intersection) -> Vec<LightState> {
        intersection.signal_groups.values().map(|g| g.state).collect()
    }

    fn controller(initial: &[LightState]) -> SignalController {
        SignalController::new(
            groups(initial),
            BTreeMap::new(),
            Box::new(CyclicPhases::new(5.0)),
        )
        .unwrap()
    }

    #[test]
    fn strategy_by_group_count() {
        use LightState::*;
        assert_eq!(Strategy::select(&groups(&[Red])).unwrap(), Strategy::SingleLane);
        assert_eq!(
            Strategy::select(&groups(&[Red, Red])).unwrap(),
            Strategy::Synchronized
        );
        assert_eq!(
            Strategy::select(&groups(&[Red, Green])).unwrap(),
            Strategy::Independent
        );
        assert_eq!(
            Strategy::select(&groups(&[Red, Red, Yellow, Yellow])).unwrap(),
            Strategy::Junction
        );
        for n in [0, 3, 5] {
            let result = Strategy::select(&groups(&vec![Red; n]));
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn single_lane_cycles() {
        use LightState::*;
        let mut c = controller(&[Red]);
        let seen: Vec<_> = (0..4).map(|i| states(&c.phase(i as f64).unwrap())[0]).collect();
        assert_eq!(seen, vec![Green, Yellow, Red, Green]);
    }

    #[test]
    fn synchronized_groups_move_together() {
        use LightState::*;
        let mut c = controller(&[Green, Green]);
        assert_eq!(states(&c.phase(0.0).unwrap()), vec![Yellow, Yellow]);
        assert_eq!(states(&c.phase(5.0).unwrap()), vec![Red, Red]);
        assert_eq!(states(&c.phase(10.0).unwrap()), vec![Green, Green]);
    }

    #[test]
    fn paired_groups_synchronize_once_they_meet() {
        use LightState::*;
        let mut c = controller(&[Red, Green]);
        assert_eq!(c.strategy(), Strategy::Independent);

        assert_eq!(states(&c.phase(0.0).unwrap()), vec![Red, Yellow]);
        assert_eq!(c.strategy(), Strategy::Independent);
        assert_eq!(states(&c.phase(1.0).unwrap()), vec![Red, Red]);
        assert_eq!(c.strategy(), Strategy::Synchronized);
        assert_eq!(states(&c.phase(2.0).unwrap()), vec![Green, Green]);
        assert_eq!(states(&c.phase(3.0).unwrap()), vec![Yellow, Yellow]);
    }

    /// Turns group 2 green on every phase, leaving the others alone
    struct SplitSecond;

    impl PhaseActuator for SplitSecond {
        fn advance(
            &mut self,
            _strategy: Strategy,
            groups: &mut BTreeMap<u32, SignalGroup>,
            _now: f64,
        ) -> Result<(), Error> {
            if let Some(group) = groups.get_mut(&2) {
                group.state = LightState::Green;
            }
            Ok(())
        }
    }

    #[test]
    fn strategy_follows_diverging_groups() {
        use LightState::*;
        let mut c =
            SignalController::new(groups(&[Red, Red]), BTreeMap::new(), Box::new(SplitSecond))
                .unwrap();
        assert_eq!(c.strategy(), Strategy::Synchronized);
        assert_eq!(states(&c.phase(0.0).unwrap()), vec![Red, Green]);
        assert_eq!(c.strategy(), Strategy::Independent);
    }

    #[test]
    fn junction_alternates_axes() {
        use LightState::*;
        let mut c = controller(&[Red, Red, Yellow, Yellow]);
        assert_eq!(states(&c.phase(0.0).unwrap()), vec![Red, Red, Red, Red]);
        assert_eq!(states(&c.phase(1.0).unwrap()), vec![Green, Green, Red, Red]);
        assert_eq!(states(&c.phase(2.0).unwrap()), vec![Yellow, Yellow, Red, Red]);
        assert_eq!(states(&c.phase(3.0).unwrap()), vec![Red, Red, Red, Red]);
        assert_eq!(states(&c.phase(4.0).unwrap()), vec![Red, Red, Green, Green]);
    }

    #[test]
    fn phase_window_is_stamped() {
        let mut c = controller(&[LightState::Red]);
        let intersection = c.phase(100.0).unwrap();
        let group = intersection.signal_groups[&1];
        assert_eq!((group.start, group.end), (100.0, 105.0));
    }

    #[test]
    fn declared_count_must_match() {
        let mut interface = NodeInterface::rsu(
            NodeId(1),
            "tls",
            Location::new(1000.0, 0.0),
            Some((
                groups(&[LightState::Red]),
                BTreeMap::from([(
                    1,
                    Movement {
                        direction: Heading::South,
                        pedestrian_detection: false,
                    },
                )]),
            )),
        );
        assert!(SignalController::from_interface(&interface, Box::new(CyclicPhases::new(5.0)))
            .unwrap()
            .is_some());
        interface.num_tls = Some(2);
        assert!(
            SignalController::from_interface(&interface, Box::new(CyclicPhases::new(5.0)))
                .is_err()
        );

        let plain = NodeInterface::rsu(NodeId(2), "toll", Location::default(), None);
        assert!(SignalController::from_interface(&plain, Box::new(CyclicPhases::new(5.0)))
            .unwrap()
            .is_none());
    }
}
