// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Node configuration and its defaults

use std::time::Duration;

pub mod node;

/// Radius of the zone in which two reports count as the same hazard
pub const ZONE_RADIUS: f64 = 20.0;

/// Seconds without update after which a hazard record is evicted
pub const HAZARD_TIMEOUT: f64 = 300.0;

/// Period of the hazard store maintenance
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(10);

/// Duration of one signal phase
pub const PHASE_DURATION: Duration = Duration::from_secs(5);

/// Pause of the controller stage after an internal fault
pub const FAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Delay before a controller starts
pub const WARM_UP: Duration = Duration::ZERO;
