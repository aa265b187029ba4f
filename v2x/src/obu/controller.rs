// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::vehicle::{Vehicle, VehicleCommand};
use crate::clock::SharedClock;
use crate::error::Error;
use crate::message::den::{EventType, HazardEvent};
use crate::message::ivim::Situation;
use crate::message::spat::{Intersection, LightState};
use crate::message::Payload;
use crate::pipeline::controller::{Command, Controller, ControllerInput, EmitSender};
use crate::pipeline::emit::EmitRequest;
use crate::topology::{Heading, Location, NodeId};
use log::{debug, info, warn};

/// Severity from which an announced situation calls for very slow driving
const VERY_SLOW_SEVERITY: u8 = 4;
/// Confidence from which an announced situation calls for very slow driving
const VERY_SLOW_CONFIDENCE: f64 = 0.5;

/// Speed reaction to an announced situation
pub fn ivim_reaction(situation: &Situation) -> VehicleCommand {
    if situation.severity >= VERY_SLOW_SEVERITY && situation.confidence >= VERY_SLOW_CONFIDENCE {
        VehicleCommand::VerySlow
    } else {
        VehicleCommand::SlowDown
    }
}

/// Reaction to a light state on the vehicle's own movement
pub fn spat_reaction(state: LightState) -> VehicleCommand {
    match state {
        LightState::Red => VehicleCommand::Stop,
        LightState::Yellow => VehicleCommand::VerySlow,
        LightState::Green => VehicleCommand::MoveForward,
    }
}

/// Onboard unit decision logic: vehicle control and hazard origination
pub struct ObuController {
    node: NodeId,
    location: Location,
    heading: Option<Heading>,
    vehicle: Vehicle,
    clock: SharedClock,
}

impl ObuController {
    pub fn new(
        node: NodeId,
        location: Location,
        heading: Option<Heading>,
        vehicle: Vehicle,
        clock: SharedClock,
    ) -> Self {
        Self {
            node,
            location,
            heading,
            vehicle,
            clock,
        }
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    fn apply(&mut self, command: VehicleCommand) -> Result<(), Error> {
        self.vehicle.apply(command).map(|_| ())
    }

    /// A DEN authored by this vehicle
    fn originate(&self, event: HazardEvent, emit: EmitSender) -> Result<(), Error> {
        let event = event.reported_by(self.node).at(self.clock.now());
        info!(
            "OBU {} reports {} at {}",
            self.node, event.event_type, event.location
        );
        emit.send(EmitRequest::Den(event))
    }

    fn on_ivim(&mut self, situation: Situation, emit: EmitSender) -> Result<(), Error> {
        if matches!(
            situation.event_type,
            EventType::Roadworks | EventType::VehicleBreakdown
        ) {
            let location = situation.location.unwrap_or(self.location);
            let event = HazardEvent::new(situation.event_type, location)
                .subtype(situation.hazard_subtype)
                .severity(situation.severity)
                .confidence(situation.confidence);
            self.originate(event, emit)?;
        }
        self.apply(ivim_reaction(&situation))
    }

    fn on_spat(&mut self, intersection: &Intersection) -> Result<(), Error> {
        let Some(heading) = self.heading else {
            return Ok(());
        };
        let mut result = Ok(());
        for state in intersection.states_for(heading) {
            let outcome = self.apply(spat_reaction(state));
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }
}

impl Controller for ObuController {
    fn start(&mut self, _emit: EmitSender) -> Result<(), Error> {
        for command in [
            VehicleCommand::Open,
            VehicleCommand::TurnOn,
            VehicleCommand::MoveForward,
        ] {
            self.apply(command)?;
        }
        info!("OBU {} on the road", self.node);
        Ok(())
    }

    fn handle(&mut self, input: ControllerInput, emit: EmitSender) -> Result<(), Error> {
        match input {
            ControllerInput::Message(envelope) => match envelope.payload {
                Payload::Den { event } => {
                    debug!(
                        "OBU {} warned of {} by {}",
                        self.node, event.event_type, envelope.origin_node
                    );
                    self.apply(VehicleCommand::SlowDown)
                }
                Payload::Ivim { situation } => self.on_ivim(situation, emit),
                Payload::Spat { intersection } => self.on_spat(&intersection),
                Payload::Ca(_) => Ok(()),
            },
            ControllerInput::Command(Command::Vehicle(command)) => self.apply(command),
            ControllerInput::Command(Command::ReportHazard {
                event_type,
                hazard_subtype,
                severity,
                confidence,
                distance,
            }) => {
                let location = self.location.project(self.heading, distance);
                let event = HazardEvent::new(event_type, location)
                    .subtype(hazard_subtype)
                    .severity(severity)
                    .confidence(confidence);
                self.originate(event, emit)
            }
            ControllerInput::Command(command) => {
                warn!("OBU {} cannot {command}", self.node);
                Ok(())
            }
        }
    }
}
