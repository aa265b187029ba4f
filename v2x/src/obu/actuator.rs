// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Vehicle actuators

use super::vehicle::VehicleCommand;
use crate::error::Error;
use crate::topology::NodeId;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One-way actuator calls of a vehicle
pub trait Actuator: Send {
    fn actuate(&mut self, command: VehicleCommand) -> Result<(), Error>;
}

/// Actuator that only reports what it was asked to do
#[derive(Debug, Clone, Copy)]
pub struct LoggingActuator {
    node: NodeId,
}

impl LoggingActuator {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

impl Actuator for LoggingActuator {
    fn actuate(&mut self, command: VehicleCommand) -> Result<(), Error> {
        info!("Vehicle {}: {command}", self.node);
        Ok(())
    }
}

/// Actuator keeping a shared log of accepted calls; clones share the log.
///
/// Can be told to fail the next call.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    calls: Arc<Mutex<Vec<VehicleCommand>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingActuator {
    /// Accepted calls so far
    pub fn calls(&self) -> Vec<VehicleCommand> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::Release);
    }
}

impl Actuator for RecordingActuator {
    fn actuate(&mut self, command: VehicleCommand) -> Result<(), Error> {
        if self.fail_next.swap(false, Ordering::AcqRel) {
            return Err(Error::Actuator(format!("{command} failed")));
        }
        self.calls
            .lock()
            .map_err(|_| Error::Actuator("call log poisoned".into()))?
            .push(command);
        Ok(())
    }
}
