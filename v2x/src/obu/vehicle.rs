// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Vehicle control state machine
//!
//! Actuation requests reach the vehicle in a strict order. A request is first checked against
//! the transition table and only then handed to the [Actuator]. Rejected requests and failed
//! actuator calls leave the state untouched.

use super::actuator::Actuator;
use crate::error::Error;
use log::{debug, warn};
use std::fmt::Display;

/// Control state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VehicleState {
    #[default]
    Closed,
    Opened,
    Ready,
    Moving,
    NotReady,
    Stopped,
}

impl Display for VehicleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleState::Closed => write!(f, "closed"),
            VehicleState::Opened => write!(f, "opened"),
            VehicleState::Ready => write!(f, "ready"),
            VehicleState::Moving => write!(f, "moving"),
            VehicleState::NotReady => write!(f, "not_ready"),
            VehicleState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Actuation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleCommand {
    Open,
    Close,
    TurnOn,
    TurnOff,
    MoveForward,
    Stop,
    SlowDown,
    VerySlow,
}

impl VehicleCommand {
    pub const ALL: [VehicleCommand; 8] = [
        VehicleCommand::Open,
        VehicleCommand::Close,
        VehicleCommand::TurnOn,
        VehicleCommand::TurnOff,
        VehicleCommand::MoveForward,
        VehicleCommand::Stop,
        VehicleCommand::SlowDown,
        VehicleCommand::VerySlow,
    ];
}

impl Display for VehicleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleCommand::Open => write!(f, "open"),
            VehicleCommand::Close => write!(f, "close"),
            VehicleCommand::TurnOn => write!(f, "turn_on"),
            VehicleCommand::TurnOff => write!(f, "turn_off"),
            VehicleCommand::MoveForward => write!(f, "move_forward"),
            VehicleCommand::Stop => write!(f, "stop"),
            VehicleCommand::SlowDown => write!(f, "slow_down"),
            VehicleCommand::VerySlow => write!(f, "very_slow"),
        }
    }
}

/// Speed profile while moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Speed {
    #[default]
    Cruise,
    Slow,
    VerySlow,
}

impl Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speed::Cruise => write!(f, "cruise"),
            Speed::Slow => write!(f, "slow"),
            Speed::VerySlow => write!(f, "very slow"),
        }
    }
}

/// Where a command leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    To(VehicleState),
    /// Stay moving, only change speed
    Speed(Speed),
}

/// Look up `command` in the transition table for `state`
fn transition(state: VehicleState, command: VehicleCommand) -> Option<Transition> {
    use VehicleCommand as C;
    use VehicleState as S;

    let transition = match (command, state) {
        (C::Open, S::Closed) => Transition::To(S::Opened),
        (C::Close, S::Opened | S::Moving | S::NotReady | S::Stopped) => Transition::To(S::Closed),
        (C::TurnOn, S::Opened | S::NotReady) => Transition::To(S::Ready),
        (C::TurnOff, S::Ready | S::Moving | S::Stopped) => Transition::To(S::NotReady),
        (C::MoveForward, S::Ready | S::Stopped) => Transition::To(S::Moving),
        (C::MoveForward, S::Moving) => Transition::Speed(Speed::Cruise),
        (C::Stop, S::Moving | S::NotReady) => Transition::To(S::Stopped),
        (C::SlowDown, S::Moving) => Transition::Speed(Speed::Slow),
        (C::VerySlow, S::Moving) => Transition::Speed(Speed::VerySlow),
        _ => return None,
    };
    Some(transition)
}

/// Whether `command` is accepted in `state`
pub fn is_legal(state: VehicleState, command: VehicleCommand) -> bool {
    transition(state, command).is_some()
}

/// A vehicle with its actuator
pub struct Vehicle {
    state: VehicleState,
    speed: Speed,
    actuator: Box<dyn Actuator>,
}

impl Vehicle {
    /// A closed vehicle
    pub fn new(actuator: Box<dyn Actuator>) -> Self {
        Self {
            state: VehicleState::Closed,
            speed: Speed::Cruise,
            actuator,
        }
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Apply `command`: check legality, call the actuator, then commit the new state.
    ///
    /// Returns [Error::IllegalTransition] without touching the actuator when the command is
    /// not allowed, or the actuator's error when the call fails.
    pub fn apply(&mut self, command: VehicleCommand) -> Result<VehicleState, Error> {
        let Some(transition) = transition(self.state, command) else {
            warn!("Rejected command {command} in state {}", self.state);
            return Err(Error::IllegalTransition {
                state: self.state,
                command,
            });
        };

        if let Err(e) = self.actuator.actuate(command) {
            warn!("Actuator failed on {command} in state {}: {e}", self.state);
            return Err(e);
        }

        match transition {
            Transition::To(next) => {
                debug!("Vehicle {} -> {next} ({command})", self.state);
                self.state = next;
                if next == VehicleState::Moving {
                    self.speed = Speed::Cruise;
                }
            }
            Transition::Speed(speed) => {
                debug!("Vehicle speed {} -> {speed} ({command})", self.speed);
                self.speed = speed;
            }
        }
        Ok(self.state)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::obu::actuator::RecordingActuator;

    const STATES: [VehicleState; 6] = [
        VehicleState::Closed,
        VehicleState::Opened,
        VehicleState::Ready,
        VehicleState::Moving,
        VehicleState::NotReady,
        VehicleState::Stopped,
    ];

    /// Drive a fresh vehicle into `target` using legal commands only
    fn vehicle_in(target: VehicleState, actuator: RecordingActuator) -> Vehicle {
        use VehicleCommand as C;
        let path: &[VehicleCommand] = match target {
            VehicleState::Closed => &[],
            VehicleState::Opened => &[C::Open],
            VehicleState::Ready => &[C::Open, C::TurnOn],
            VehicleState::Moving => &[C::Open, C::TurnOn, C::MoveForward],
            VehicleState::NotReady => &[C::Open, C::TurnOn, C::TurnOff],
            VehicleState::Stopped => &[C::Open, C::TurnOn, C::MoveForward, C::Stop],
        };
        let mut vehicle = Vehicle::new(Box::new(actuator));
        for command in path {
            vehicle.apply(*command).unwrap();
        }
        assert_eq!(vehicle.state(), target);
        vehicle
    }

    #[test]
    fn closed_vehicle_refuses_to_move() {
        let actuator = RecordingActuator::default();
        let mut vehicle = Vehicle::new(Box::new(actuator.clone()));
        let result = vehicle.apply(VehicleCommand::MoveForward);
        assert!(matches!(
            result,
            Err(Error::IllegalTransition {
                state: VehicleState::Closed,
                command: VehicleCommand::MoveForward
            })
        ));
        assert_eq!(vehicle.state(), VehicleState::Closed);
        assert!(actuator.calls().is_empty());
    }

    #[test]
    fn initialization_sequence() {
        let actuator = RecordingActuator::default();
        let mut vehicle = Vehicle::new(Box::new(actuator.clone()));
        vehicle.apply(VehicleCommand::Open).unwrap();
        vehicle.apply(VehicleCommand::TurnOn).unwrap();
        let state = vehicle.apply(VehicleCommand::MoveForward).unwrap();
        assert_eq!(state, VehicleState::Moving);
        assert_eq!(
            actuator.calls(),
            vec![
                VehicleCommand::Open,
                VehicleCommand::TurnOn,
                VehicleCommand::MoveForward
            ]
        );
    }

    #[test]
    fn illegal_pairs_leave_state_unchanged() {
        for state in STATES {
            for command in VehicleCommand::ALL {
                if is_legal(state, command) {
                    continue;
                }
                let actuator = RecordingActuator::default();
                let mut vehicle = vehicle_in(state, actuator.clone());
                let before = actuator.calls().len();
                assert!(vehicle.apply(command).is_err(), "{command} in {state}");
                assert_eq!(vehicle.state(), state);
                assert_eq!(actuator.calls().len(), before);
            }
        }
    }

    #[test]
    fn legal_pairs_reach_their_target() {
        use VehicleCommand as C;
        use VehicleState as S;
        let expected = [
            (S::Closed, C::Open, S::Opened),
            (S::Opened, C::Close, S::Closed),
            (S::Opened, C::TurnOn, S::Ready),
            (S::Ready, C::TurnOff, S::NotReady),
            (S::Ready, C::MoveForward, S::Moving),
            (S::Moving, C::Stop, S::Stopped),
            (S::Moving, C::TurnOff, S::NotReady),
            (S::Moving, C::Close, S::Closed),
            (S::Moving, C::SlowDown, S::Moving),
            (S::Moving, C::VerySlow, S::Moving),
            (S::NotReady, C::Stop, S::Stopped),
            (S::NotReady, C::TurnOn, S::Ready),
            (S::NotReady, C::Close, S::Closed),
            (S::Stopped, C::MoveForward, S::Moving),
            (S::Stopped, C::TurnOff, S::NotReady),
            (S::Stopped, C::Close, S::Closed),
        ];
        for (from, command, to) in expected {
            let mut vehicle = vehicle_in(from, RecordingActuator::default());
            assert_eq!(vehicle.apply(command).unwrap(), to, "{command} in {from}");
        }
    }

    #[test]
    fn speed_changes_only_while_moving() {
        let mut vehicle = vehicle_in(VehicleState::Moving, RecordingActuator::default());
        vehicle.apply(VehicleCommand::VerySlow).unwrap();
        assert_eq!(vehicle.speed(), Speed::VerySlow);
        vehicle.apply(VehicleCommand::MoveForward).unwrap();
        assert_eq!(vehicle.speed(), Speed::Cruise);
        vehicle.apply(VehicleCommand::SlowDown).unwrap();
        vehicle.apply(VehicleCommand::Stop).unwrap();
        vehicle.apply(VehicleCommand::MoveForward).unwrap();
        assert_eq!(vehicle.speed(), Speed::Cruise);
    }

    #[test]
    fn actuator_failure_keeps_state() {
        let actuator = RecordingActuator::default();
        let mut vehicle = vehicle_in(VehicleState::Ready, actuator.clone());
        actuator.fail_next();
        assert!(matches!(
            vehicle.apply(VehicleCommand::MoveForward),
            Err(Error::Actuator(_))
        ));
        assert_eq!(vehicle.state(), VehicleState::Ready);
        assert_eq!(
            vehicle.apply(VehicleCommand::MoveForward).unwrap(),
            VehicleState::Moving
        );
    }
}
