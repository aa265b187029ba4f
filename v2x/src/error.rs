// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! V2X Error implementation

use crate::obu::vehicle::{VehicleCommand, VehicleState};

/// V2X Error type
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// A queue peer went away
    Channel(&'static str),
    /// The owning node is shutting down
    Shutdown,
    /// A message record lacks a required field or cannot be decoded
    Malformed(String),
    /// The vehicle state machine refused a command
    IllegalTransition {
        state: VehicleState,
        command: VehicleCommand,
    },
    /// An actuator call reported failure
    Actuator(String),
    /// Invalid node or intersection configuration
    Configuration(String),
    /// Unexpected internal fault inside a stage
    Fault(String),
}

impl Error {
    /// Whether the task boundary should back off before resuming
    pub fn is_fault(&self) -> bool {
        matches!(self, Error::Fault(_))
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Channel(description) => write!(f, "Channel error, {}", description),
            Error::Shutdown => write!(f, "Node is shutting down"),
            Error::Malformed(description) => write!(f, "Malformed message: {}", description),
            Error::IllegalTransition { state, command } => {
                write!(f, "Command {command} is not allowed in state {state}")
            }
            Error::Actuator(description) => write!(f, "Actuator error: {}", description),
            Error::Configuration(description) => {
                write!(f, "Configuration error: {}", description)
            }
            Error::Fault(description) => write!(f, "Internal fault: {}", description),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Malformed(e.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
