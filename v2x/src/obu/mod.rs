// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Onboard unit: vehicle control state machine and its controller

pub mod actuator;
pub mod controller;
pub mod vehicle;

pub use actuator::{Actuator, LoggingActuator, RecordingActuator};
pub use controller::ObuController;
pub use vehicle::{Speed, Vehicle, VehicleCommand, VehicleState};
