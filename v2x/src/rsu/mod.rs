// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Roadside unit: hazard aggregation, dissemination and intersection signal control

pub mod controller;
pub mod forwarding;
pub mod hazard_store;
pub mod signal;

pub use controller::RsuController;
pub use forwarding::ForwardingPolicy;
pub use hazard_store::{ActiveHazardRecord, HazardStore, IngestOutcome, RecordId};
pub use signal::{CyclicPhases, PhaseActuator, SignalController, Strategy};
