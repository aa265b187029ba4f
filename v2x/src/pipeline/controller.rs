// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Controller stage: the stateful decision core of a node

use super::emit::EmitRequest;
use crate::error::Error;
use crate::message::den::{EventType, HazardSubtype};
use crate::message::ivim::ManualSituation;
use crate::message::Envelope;
use crate::obu::vehicle::VehicleCommand;
use crate::queue::{Receiver, RecvError, Sender, ShutdownFlag, SHUTDOWN_POLL};
use crate::topology::NodeId;
use log::{debug, error, info, warn};
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{span, Level};

/// Commands of the external control surfaces
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Announce a situation at the RSU's own position
    ManualSituation(ManualSituation),
    /// Log the active hazard records of an RSU
    ListHazards,
    /// Drive the vehicle state machine directly
    Vehicle(VehicleCommand),
    /// The on-board sensors detected a hazard `distance` units ahead
    ReportHazard {
        event_type: EventType,
        hazard_subtype: Option<HazardSubtype>,
        severity: u8,
        confidence: f64,
        distance: f64,
    },
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::ManualSituation(situation) => write!(f, "announce {situation}"),
            Command::ListHazards => write!(f, "list hazards"),
            Command::Vehicle(command) => write!(f, "vehicle {command}"),
            Command::ReportHazard { event_type, .. } => write!(f, "report {event_type}"),
        }
    }
}

/// Item of the controller queue
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerInput {
    Message(Envelope),
    Command(Command),
}

impl From<Envelope> for ControllerInput {
    fn from(envelope: Envelope) -> Self {
        ControllerInput::Message(envelope)
    }
}

impl From<Command> for ControllerInput {
    fn from(command: Command) -> Self {
        ControllerInput::Command(command)
    }
}

impl Display for ControllerInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerInput::Message(envelope) => envelope.fmt(f),
            ControllerInput::Command(command) => command.fmt(f),
        }
    }
}

/// Queue towards the emit stage as seen by a controller
pub type EmitSender<'a> = &'a mut dyn Sender<EmitRequest>;

/// Node-specific decision logic driven by the controller stage
pub trait Controller: Send {
    /// Called once before the first input is handled
    fn start(&mut self, _emit: EmitSender) -> Result<(), Error> {
        Ok(())
    }

    /// Handle one item of the controller queue
    fn handle(&mut self, input: ControllerInput, emit: EmitSender) -> Result<(), Error>;

    /// Run every timer that is due at `now`
    fn on_timers(&mut self, _now: Instant, _emit: EmitSender) -> Result<(), Error> {
        Ok(())
    }

    /// Earliest pending timer deadline, if any
    fn next_deadline(&self) -> Option<Instant> {
        None
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn start(&mut self, emit: EmitSender) -> Result<(), Error> {
        (**self).start(emit)
    }

    fn handle(&mut self, input: ControllerInput, emit: EmitSender) -> Result<(), Error> {
        (**self).handle(input, emit)
    }

    fn on_timers(&mut self, now: Instant, emit: EmitSender) -> Result<(), Error> {
        (**self).on_timers(now, emit)
    }

    fn next_deadline(&self) -> Option<Instant> {
        (**self).next_deadline()
    }
}

/// Timing of the controller stage
#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    /// Delay before the controller starts
    pub warm_up: Duration,
    /// Pause after an internal fault
    pub fault_backoff: Duration,
}

/// Controller stage main function
pub(crate) fn run<C, R, S>(
    node: NodeId,
    mut controller: C,
    mut queue: R,
    mut emit: S,
    timing: StageTiming,
    shutdown: ShutdownFlag,
) where
    C: Controller,
    R: Receiver<ControllerInput>,
    S: Sender<EmitRequest>,
{
    if !pause(timing.warm_up, &shutdown) {
        return;
    }

    debug!("Starting controller of node {node}");
    let result = {
        let _span = span!(Level::INFO, "Start", node = %node).entered();
        guarded(|| controller.start(&mut emit))
    };
    if !report(node, result, timing, &shutdown) {
        return;
    }

    while !shutdown.is_set() {
        let timeout = controller
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::MAX);

        let result = match queue.recv_timeout(timeout) {
            Ok(input) => {
                let _span = span!(Level::INFO, "Handle", node = %node, input = %input).entered();
                guarded(|| controller.handle(input, &mut emit))
            }
            Err(RecvError::Timeout) => Ok(()),
            Err(RecvError::Shutdown) => break,
        };
        if !report(node, result, timing, &shutdown) {
            break;
        }

        // Timers are checked after every item so a busy queue cannot starve them
        let now = Instant::now();
        if controller.next_deadline().is_some_and(|d| d <= now) {
            let result = {
                let _span = span!(Level::INFO, "Timers", node = %node).entered();
                guarded(|| controller.on_timers(now, &mut emit))
            };
            if !report(node, result, timing, &shutdown) {
                break;
            }
        }
    }
    debug!("Controller of node {node} stopped");
}

/// Log the outcome of a controller call, backing off after faults.
/// Returns false once the stage should stop.
fn report(
    node: NodeId,
    result: Result<(), Error>,
    timing: StageTiming,
    shutdown: &ShutdownFlag,
) -> bool {
    match result {
        Ok(()) => true,
        Err(Error::Shutdown) => false,
        Err(e) if e.is_fault() => {
            error!("Node {node}: {e}, resuming in {:?}", timing.fault_backoff);
            pause(timing.fault_backoff, shutdown)
        }
        Err(e @ Error::IllegalTransition { .. }) => {
            debug!("Node {node}: {e}");
            true
        }
        Err(e @ Error::Channel(_)) => {
            info!("Node {node}: {e}");
            true
        }
        Err(e) => {
            warn!("Node {node}: {e}");
            true
        }
    }
}

/// Run `f`, turning a panic into [Error::Fault]
fn guarded<F>(f: F) -> Result<(), Error>
where
    F: FnOnce() -> Result<(), Error>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::Fault(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with unknown payload".to_owned()
    }
}

/// Sleep for `duration` in shutdown poll slices. Returns false if shutdown was requested.
pub(crate) fn pause(duration: Duration, shutdown: &ShutdownFlag) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if shutdown.is_set() {
            return false;
        }
        let left = deadline.map_or(SHUTDOWN_POLL, |d| d.saturating_duration_since(Instant::now()));
        if left.is_zero() {
            return true;
        }
        thread::sleep(left.min(SHUTDOWN_POLL));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn panic_becomes_fault() {
        let result = guarded(|| panic!("boom"));
        match result {
            Err(Error::Fault(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected {other:?}"),
        }
        let formatted = guarded(|| panic!("boom {}", 42));
        assert!(matches!(formatted, Err(Error::Fault(msg)) if msg == "boom 42"));
    }

    #[test]
    fn pause_stops_on_shutdown() {
        let flag = ShutdownFlag::new();
        assert!(pause(Duration::from_millis(1), &flag));
        flag.trigger();
        let start = Instant::now();
        assert!(!pause(Duration::from_secs(10), &flag));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn illegal_transition_is_not_a_fault() {
        let flag = ShutdownFlag::new();
        let timing = StageTiming {
            warm_up: Duration::ZERO,
            fault_backoff: Duration::from_secs(10),
        };
        let start = Instant::now();
        let result = Err(Error::IllegalTransition {
            state: crate::obu::vehicle::VehicleState::Closed,
            command: VehicleCommand::MoveForward,
        });
        assert!(report(NodeId(1), result, timing, &flag));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
