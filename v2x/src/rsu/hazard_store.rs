// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Aggregation of hazard reports into canonical records
//!
//! Independent reports of the same physical event (same event type, within the zone radius
//! of the record's first location) are merged into one [ActiveHazardRecord]. Records live in a
//! dense map keyed by creation order; a grid index with cells as wide as the zone radius
//! narrows every lookup to the 3x3 cells around the report.

use super::forwarding::ForwardingPolicy;
use crate::message::den::{EventType, HazardEvent, SubtypeName};
use crate::message::ivim::Situation;
use crate::topology::{Location, NodeId, Zone};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

/// Record id, increasing in creation order
pub type RecordId = u64;

/// Canonical copy of a hazard kept by an RSU
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveHazardRecord {
    pub id: RecordId,
    pub canonical_event: HazardEvent,
    pub first_seen: f64,
    pub last_update: f64,
    pub confirmation_count: u32,
    pub forwarded: bool,
    /// Severity carried by the last forwarded announcement
    pub forwarded_severity: Option<u8>,
}

impl ActiveHazardRecord {
    pub fn new(id: RecordId, canonical_event: HazardEvent, now: f64) -> Self {
        Self {
            id,
            canonical_event,
            first_seen: now,
            last_update: now,
            confirmation_count: 1,
            forwarded: false,
            forwarded_severity: None,
        }
    }

    pub fn location(&self) -> Location {
        self.canonical_event.location
    }

    pub fn mark_forwarded(&mut self) {
        self.forwarded = true;
        self.forwarded_severity = Some(self.canonical_event.severity);
    }

    /// Fold a report from a new reporter into this record
    fn merge(&mut self, report: &HazardEvent, reporter: NodeId, now: f64) {
        let event = &mut self.canonical_event;
        event.confidence = (event.confidence + report.confidence).min(1.0);
        event.severity = event.severity.max(report.severity);
        event.reporting_nodes.insert(reporter);
        self.confirmation_count += 1;
        self.last_update = now;
    }
}

impl Display for ActiveHazardRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let event = &self.canonical_event;
        write!(
            f,
            "#{} {} ({}) at {}: severity {}, confidence {:.2}, {} report(s){}",
            self.id,
            event.event_type,
            SubtypeName(event.hazard_subtype),
            event.location,
            event.severity,
            event.confidence,
            self.confirmation_count,
            if self.forwarded { ", forwarded" } else { "" }
        )
    }
}

/// What [HazardStore::ingest] did with a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No matching record, a new one was created
    Created(RecordId),
    /// Merged into an existing record
    Merged(RecordId),
    /// The reporter was already known to the matching record
    Duplicate(RecordId),
}

impl IngestOutcome {
    pub fn id(&self) -> RecordId {
        match *self {
            IngestOutcome::Created(id)
            | IngestOutcome::Merged(id)
            | IngestOutcome::Duplicate(id) => id,
        }
    }
}

type Cell = (EventType, i64, i64);

/// Table of active hazard records
#[derive(Debug)]
pub struct HazardStore {
    zone_radius: f64,
    hazard_timeout: f64,
    cell_size: f64,
    next_id: RecordId,
    records: BTreeMap<RecordId, ActiveHazardRecord>,
    grid: HashMap<Cell, BTreeSet<RecordId>>,
}

impl HazardStore {
    pub fn new(zone_radius: f64, hazard_timeout: f64) -> Self {
        let cell_size = if zone_radius > 0.0 { zone_radius } else { 1.0 };
        Self {
            zone_radius,
            hazard_timeout,
            cell_size,
            next_id: 0,
            records: BTreeMap::new(),
            grid: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&ActiveHazardRecord> {
        self.records.get(&id)
    }

    /// Copy of all active records in creation order
    pub fn snapshot(&self) -> Vec<ActiveHazardRecord> {
        self.records.values().cloned().collect()
    }

    /// Merge a report of `reporter` into the table.
    ///
    /// Severity and confidence of the report are clamped first.
    pub fn ingest(&mut self, mut report: HazardEvent, reporter: NodeId, now: f64) -> IngestOutcome {
        report.normalize();

        if let Some(id) = self.find_match(report.event_type, &report.location) {
            let Some(record) = self.records.get_mut(&id) else {
                return self.create(report, reporter, now);
            };
            if record.canonical_event.reporting_nodes.contains(&reporter) {
                debug!("Record #{id}: repeated report from {reporter} ignored");
                return IngestOutcome::Duplicate(id);
            }
            record.merge(&report, reporter, now);
            debug!("Record #{id}: merged report from {reporter}: {record}");
            return IngestOutcome::Merged(id);
        }
        self.create(report, reporter, now)
    }

    /// Mark the record forwarded if the policy says so and return the announcement
    pub fn take_forward(&mut self, id: RecordId, policy: &ForwardingPolicy) -> Option<Situation> {
        let record = self.records.get_mut(&id)?;
        if !policy.should_forward(record) {
            return None;
        }
        record.mark_forwarded();
        Some(Situation::from(&record.canonical_event))
    }

    /// Remove every record not updated for longer than the hazard timeout.
    /// Returns the removed records.
    pub fn evict_expired(&mut self, now: f64) -> Vec<ActiveHazardRecord> {
        let expired: Vec<RecordId> = self
            .records
            .values()
            .filter(|r| now - r.last_update > self.hazard_timeout)
            .map(|r| r.id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(record) = self.records.remove(&id) {
                let cell = self.cell_of(record.canonical_event.event_type, &record.location());
                if let Some(ids) = self.grid.get_mut(&cell) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        self.grid.remove(&cell);
                    }
                }
                evicted.push(record);
            }
        }
        evicted
    }

    fn create(&mut self, mut report: HazardEvent, reporter: NodeId, now: f64) -> IngestOutcome {
        let id = self.next_id;
        self.next_id += 1;

        report.reporting_nodes = BTreeSet::from([reporter]);
        let cell = self.cell_of(report.event_type, &report.location);
        let record = ActiveHazardRecord::new(id, report, now);
        debug!("Record #{id}: created from report of {reporter}: {record}");
        self.records.insert(id, record);
        self.grid.entry(cell).or_default().insert(id);
        IngestOutcome::Created(id)
    }

    /// Lowest record id of the given type whose zone contains `location`
    fn find_match(&self, event_type: EventType, location: &Location) -> Option<RecordId> {
        let (_, cx, cy) = self.cell_of(event_type, location);
        let mut best: Option<RecordId> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (event_type, cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(ids) = self.grid.get(&cell) else {
                    continue;
                };
                let hit = ids.iter().copied().find(|id| {
                    self.records.get(id).is_some_and(|r| {
                        Zone::new(r.location(), self.zone_radius).contains(location)
                    })
                });
                if let Some(id) = hit {
                    best = Some(best.map_or(id, |b| b.min(id)));
                }
            }
        }
        best
    }

    fn cell_of(&self, event_type: EventType, location: &Location) -> Cell {
        (
            event_type,
            (location.x / self.cell_size).floor() as i64,
            (location.y / self.cell_size).floor() as i64,
        )
    }
}
