// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-node message pipeline
//!
//! Every node runs three stages on their own threads, connected by ordered queues:
//!
//! ```text
//! transport -> [receive] -> controller queue -> [controller] -> emit queue -> [emit] -> transport
//! ```
//!
//! Control surfaces feed [Command](controller::Command)s into the controller queue as well.

pub mod controller;
pub mod emit;
pub mod node;
pub mod receive;
pub mod timer;

#[cfg(test)]
mod tests;

pub use controller::{Command, Controller, ControllerInput};
pub use emit::EmitRequest;
pub use node::Node;
pub use receive::{Classifier, Inbound, Verdict};
