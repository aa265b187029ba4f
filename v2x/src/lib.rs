// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Application layer runtime for vehicle-to-everything (V2X) nodes.
//!
//! Roadside units (RSU) and onboard units (OBU) exchange hazard notifications (DEN),
//! infrastructure-to-vehicle information (IVIM) and signal phase messages (SPAT).
//!
//! # Nodes and Pipelines
//!
//! Each [Node](crate::pipeline::Node) runs a receive, a controller and an emit stage on
//! threads of their own, connected by ordered [queues](crate::queue). The receive stage
//! filters inbound messages per role, the controller stage holds the node's state and the emit
//! stage publishes whatever the controller queued.
//!
//! # Decision Logic
//!
//! An RSU aggregates independent hazard reports into canonical records
//! ([HazardStore](crate::rsu::HazardStore)) and re-broadcasts them once significant. It may
//! also control an intersection ([SignalController](crate::rsu::SignalController)).
//! An OBU drives its vehicle through a strict command order ([Vehicle](crate::obu::Vehicle)).
//!
//! Nodes are configured through
//! [configuration::node::Builder](crate::configuration::node::Builder).

pub mod clock;
pub mod configuration;
pub mod error;
pub mod message;
pub mod obu;
pub mod pipeline;
pub mod queue;
pub mod rsu;
pub mod topology;

/// Re-export the public API
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
    pub use crate::configuration::node::Builder as NodeBuilder;
    pub use crate::error::Error;
    pub use crate::message::den::{EventType, HazardEvent, HazardSubtype};
    pub use crate::message::ivim::{ManualSituation, Situation};
    pub use crate::message::spat::{Intersection, LightState};
    pub use crate::message::{Envelope, MsgType, Payload};
    pub use crate::obu::{VehicleCommand, VehicleState};
    pub use crate::pipeline::{Command, Inbound, Node};
    pub use crate::queue::{channel, Receiver, Sender};
    pub use crate::rsu::ForwardingPolicy;
    pub use crate::topology::{Heading, Location, NodeId, NodeInterface, NodeKind};
}
