// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Decides when an aggregated hazard is re-broadcast to vehicles

use super::hazard_store::ActiveHazardRecord;

/// Thresholds of the dissemination policy, evaluated on the merged record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardingPolicy {
    /// Forward once confidence is strictly above this value
    pub confidence_above: f64,
    /// Forward once this many distinct vehicles have reported
    pub min_confirmations: u32,
    /// Forward once severity reaches this value
    pub min_severity: u8,
    /// Forward a record again when its severity rises above the last forwarded severity
    pub rearm_on_escalation: bool,
}

impl Default for ForwardingPolicy {
    fn default() -> Self {
        Self {
            confidence_above: 0.6,
            min_confirmations: 2,
            min_severity: 4,
            rearm_on_escalation: false,
        }
    }
}

impl ForwardingPolicy {
    /// Same thresholds, re-arming on escalation
    pub fn with_rearm(mut self) -> Self {
        self.rearm_on_escalation = true;
        self
    }

    /// Whether the record crosses any threshold
    pub fn is_significant(&self, record: &ActiveHazardRecord) -> bool {
        let event = &record.canonical_event;
        event.confidence > self.confidence_above
            || record.confirmation_count >= self.min_confirmations
            || event.severity >= self.min_severity
    }

    /// Whether the record is due for (re-)forwarding now
    pub fn should_forward(&self, record: &ActiveHazardRecord) -> bool {
        if !self.is_significant(record) {
            return false;
        }
        match record.forwarded_severity {
            None => !record.forwarded,
            Some(_) if !self.rearm_on_escalation => false,
            Some(severity) => record.canonical_event.severity > severity,
        }
    }
}
