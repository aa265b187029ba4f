// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::forwarding::ForwardingPolicy;
use super::hazard_store::{HazardStore, IngestOutcome};
use super::signal::SignalController;
use crate::clock::SharedClock;
use crate::error::Error;
use crate::message::den::HazardEvent;
use crate::message::Payload;
use crate::pipeline::controller::{Command, Controller, ControllerInput, EmitSender};
use crate::pipeline::emit::EmitRequest;
use crate::pipeline::timer::{earliest, Interval};
use crate::topology::{Location, NodeId};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Roadside unit decision logic: hazard aggregation, dissemination and signal control
pub struct RsuController {
    node: NodeId,
    location: Location,
    store: HazardStore,
    policy: ForwardingPolicy,
    clock: SharedClock,
    maintenance: Interval,
    signals: Option<(SignalController, Interval)>,
}

impl RsuController {
    pub fn new(
        node: NodeId,
        location: Location,
        store: HazardStore,
        policy: ForwardingPolicy,
        clock: SharedClock,
        maintenance_interval: Duration,
    ) -> Self {
        Self {
            node,
            location,
            store,
            policy,
            clock,
            maintenance: Interval::new(maintenance_interval, Instant::now()),
            signals: None,
        }
    }

    /// Control an intersection, publishing its first phase right away and then every
    /// `phase_duration`
    pub fn with_signals(mut self, signals: SignalController, phase_duration: Duration) -> Self {
        self.signals = Some((signals, Interval::immediate(phase_duration, Instant::now())));
        self
    }

    pub fn store(&self) -> &HazardStore {
        &self.store
    }

    fn on_den(
        &mut self,
        event: HazardEvent,
        reporter: NodeId,
        emit: EmitSender,
    ) -> Result<(), Error> {
        let outcome = self.store.ingest(event, reporter, self.clock.now());
        if let IngestOutcome::Duplicate(_) = outcome {
            return Ok(());
        }
        if let Some(situation) = self.store.take_forward(outcome.id(), &self.policy) {
            info!(
                "RSU {} forwards record #{} as IVIM ({}, severity {}, confidence {:.2})",
                self.node,
                outcome.id(),
                situation.event_type,
                situation.severity,
                situation.confidence
            );
            emit.send(EmitRequest::Ivim(situation))?;
        }
        Ok(())
    }

    fn list_hazards(&self) {
        if self.store.is_empty() {
            info!("RSU {}: no active hazards", self.node);
            return;
        }
        let records = self.store.snapshot();
        info!("RSU {}: {} active hazard(s)", self.node, records.len());
        for record in &records {
            info!("  {record}");
        }
    }
}

impl Controller for RsuController {
    fn handle(&mut self, input: ControllerInput, emit: EmitSender) -> Result<(), Error> {
        match input {
            ControllerInput::Message(envelope) => match envelope.payload {
                Payload::Den { event } => self.on_den(event, envelope.origin_node, emit),
                other => {
                    debug!("RSU {} ignores {:?} payload", self.node, other);
                    Ok(())
                }
            },
            ControllerInput::Command(Command::ManualSituation(situation)) => {
                info!("RSU {} announces {situation}", self.node);
                emit.send(EmitRequest::Ivim(situation.situation(self.location)))
            }
            ControllerInput::Command(Command::ListHazards) => {
                self.list_hazards();
                Ok(())
            }
            ControllerInput::Command(command) => {
                warn!("RSU {} cannot {command}", self.node);
                Ok(())
            }
        }
    }

    fn on_timers(&mut self, now: Instant, emit: EmitSender) -> Result<(), Error> {
        if self.maintenance.fire(now) {
            let evicted = self.store.evict_expired(self.clock.now());
            for record in &evicted {
                debug!("RSU {} evicted {record}", self.node);
            }
            if !self.store.is_empty() {
                self.list_hazards();
            }
        }

        if let Some((signals, phase)) = self.signals.as_mut() {
            if phase.fire(now) {
                let intersection = signals.phase(self.clock.now())?;
                emit.send(EmitRequest::Spat(intersection))?;
            }
        }
        Ok(())
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest([
            Some(self.maintenance.deadline()),
            self.signals.as_ref().map(|(_, phase)| phase.deadline()),
        ])
    }
}
