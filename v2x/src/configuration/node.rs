// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Node builder

use super::{
    FAULT_BACKOFF, HAZARD_TIMEOUT, MAINTENANCE_INTERVAL, PHASE_DURATION, WARM_UP, ZONE_RADIUS,
};
use crate::clock::{SharedClock, SystemClock};
use crate::error::Error;
use crate::message::Envelope;
use crate::obu::actuator::{Actuator, LoggingActuator};
use crate::obu::controller::ObuController;
use crate::obu::vehicle::Vehicle;
use crate::pipeline::controller::{Controller, StageTiming};
use crate::pipeline::node::Node;
use crate::queue::Sender;
use crate::rsu::controller::RsuController;
use crate::rsu::forwarding::ForwardingPolicy;
use crate::rsu::hazard_store::HazardStore;
use crate::rsu::signal::{CyclicPhases, PhaseActuator, SignalController};
use crate::topology::{NodeInterface, NodeKind};
use std::sync::Arc;
use std::time::Duration;

/// Configuration of one node, turned into a running [Node] by [Builder::build]
pub struct Builder {
    interface: NodeInterface,
    zone_radius: f64,
    hazard_timeout: f64,
    maintenance_interval: Duration,
    phase_duration: Duration,
    fault_backoff: Duration,
    warm_up: Duration,
    forwarding: ForwardingPolicy,
    actuator: Option<Box<dyn Actuator>>,
    phase_actuator: Option<Box<dyn PhaseActuator>>,
    clock: Option<SharedClock>,
}

impl Builder {
    /// Create a builder with default settings for the node described by `interface`
    pub fn new(interface: NodeInterface) -> Self {
        Self {
            interface,
            zone_radius: ZONE_RADIUS,
            hazard_timeout: HAZARD_TIMEOUT,
            maintenance_interval: MAINTENANCE_INTERVAL,
            phase_duration: PHASE_DURATION,
            fault_backoff: FAULT_BACKOFF,
            warm_up: WARM_UP,
            forwarding: ForwardingPolicy::default(),
            actuator: None,
            phase_actuator: None,
            clock: None,
        }
    }

    /// Set the radius within which reports are merged
    pub fn zone_radius(&mut self, zone_radius: f64) -> &mut Self {
        self.zone_radius = zone_radius;
        self
    }

    /// Set the age in seconds after which a hazard record is evicted
    pub fn hazard_timeout(&mut self, hazard_timeout: f64) -> &mut Self {
        self.hazard_timeout = hazard_timeout;
        self
    }

    pub fn maintenance_interval(&mut self, interval: Duration) -> &mut Self {
        self.maintenance_interval = interval;
        self
    }

    pub fn phase_duration(&mut self, phase_duration: Duration) -> &mut Self {
        self.phase_duration = phase_duration;
        self
    }

    pub fn fault_backoff(&mut self, fault_backoff: Duration) -> &mut Self {
        self.fault_backoff = fault_backoff;
        self
    }

    pub fn warm_up(&mut self, warm_up: Duration) -> &mut Self {
        self.warm_up = warm_up;
        self
    }

    pub fn forwarding(&mut self, policy: ForwardingPolicy) -> &mut Self {
        self.forwarding = policy;
        self
    }

    /// Set the vehicle actuator. Defaults to a [LoggingActuator].
    pub fn actuator(&mut self, actuator: Box<dyn Actuator>) -> &mut Self {
        self.actuator = Some(actuator);
        self
    }

    /// Set the signal phase sequencing. Defaults to [CyclicPhases].
    pub fn phase_actuator(&mut self, actuator: Box<dyn PhaseActuator>) -> &mut Self {
        self.phase_actuator = Some(actuator);
        self
    }

    /// Set the clock. Defaults to the [SystemClock].
    pub fn clock(&mut self, clock: SharedClock) -> &mut Self {
        self.clock = Some(clock);
        self
    }

    /// Build the controller for the configured node
    pub fn controller(self) -> Result<Box<dyn Controller>, Error> {
        let interface = self.interface;
        let node = interface.node_id;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        match interface.kind {
            NodeKind::Rsu => {
                let store = HazardStore::new(self.zone_radius, self.hazard_timeout);
                let mut controller = RsuController::new(
                    node,
                    interface.location(),
                    store,
                    self.forwarding,
                    clock,
                    self.maintenance_interval,
                );
                let phases = self.phase_actuator.unwrap_or_else(|| {
                    Box::new(CyclicPhases::new(self.phase_duration.as_secs_f64()))
                });
                if let Some(signals) = SignalController::from_interface(&interface, phases)? {
                    controller = controller.with_signals(signals, self.phase_duration);
                }
                Ok(Box::new(controller))
            }
            NodeKind::Obu => {
                let actuator = self
                    .actuator
                    .unwrap_or_else(|| Box::new(LoggingActuator::new(node)));
                Ok(Box::new(ObuController::new(
                    node,
                    interface.location(),
                    interface.heading,
                    Vehicle::new(actuator),
                    clock,
                )))
            }
            NodeKind::Au => Err(Error::Configuration(format!(
                "node {node} is an application unit, which runs no controller"
            ))),
        }
    }

    /// Start the node. Published messages go to `transport`.
    pub fn build<S>(self, transport: S) -> Result<Node, Error>
    where
        S: Sender<Envelope> + 'static,
    {
        let id = self.interface.node_id;
        let kind = self.interface.kind;
        let timing = StageTiming {
            warm_up: self.warm_up,
            fault_backoff: self.fault_backoff,
        };
        let controller = self.controller()?;
        Node::spawn(id, kind, controller, transport, timing)
    }
}
