// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Scenarios running complete nodes on their own threads

use super::controller::{Controller, ControllerInput, EmitSender, StageTiming};
use super::emit::EmitRequest;
use super::node::Node;
use crate::clock::ManualClock;
use crate::configuration::node::Builder;
use crate::error::Error;
use crate::message::den::{EventType, HazardEvent};
use crate::message::ivim::ManualSituation;
use crate::message::spat::{LightState, Movement, SignalGroup};
use crate::message::{Envelope, MsgType, Payload};
use crate::obu::actuator::RecordingActuator;
use crate::obu::vehicle::VehicleCommand;
use crate::pipeline::Command;
use crate::queue::{channel, IntraProcReceiver, Receiver, RecvError, Sender};
use crate::topology::{Heading, Location, NodeId, NodeInterface, NodeKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);

fn init_logging() {
    // Another test may have installed the logger already
    let _ = v2x_logger::try_init(log::LevelFilter::Warn, true);
}

fn pothole(origin: u32, x: f64, y: f64) -> Envelope {
    let event = HazardEvent::new(EventType::RoadSurfaceHazard, Location::new(x, y))
        .confidence(0.4)
        .severity(2);
    Envelope::den(NodeId(origin), event)
}

/// Poll `condition` until it holds or [WAIT] elapsed
fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < WAIT {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn rsu_node(signals: bool) -> (Node, IntraProcReceiver<Envelope>) {
    init_logging();
    let signals = signals.then(|| {
        (
            BTreeMap::from([(1, SignalGroup::new(LightState::Red))]),
            BTreeMap::from([(
                1,
                Movement {
                    direction: Heading::South,
                    pedestrian_detection: false,
                },
            )]),
        )
    });
    let interface = NodeInterface::rsu(NodeId(1), "tls", Location::new(1000.0, 0.0), signals);
    let (transport, outbound) = channel::<Envelope>();
    let mut builder = Builder::new(interface);
    builder
        .clock(Arc::new(ManualClock::new(0.0)))
        .phase_duration(Duration::from_millis(50));
    (builder.build(transport).unwrap(), outbound)
}

fn obu_node(id: u32) -> (Node, RecordingActuator, IntraProcReceiver<Envelope>) {
    init_logging();
    let interface = NodeInterface::obu(
        NodeId(id),
        "car",
        Location::new(1000.0, 100.0),
        Heading::South,
    );
    let actuator = RecordingActuator::default();
    let (transport, outbound) = channel::<Envelope>();
    let mut builder = Builder::new(interface);
    builder
        .actuator(Box::new(actuator.clone()))
        .clock(Arc::new(ManualClock::new(0.0)));
    let node = builder.build(transport).unwrap();
    assert!(eventually(|| actuator.calls().len() == 3));
    (node, actuator, outbound)
}

#[test]
fn rsu_turns_confirmed_den_into_ivim() {
    let (node, mut outbound) = rsu_node(false);

    node.receive(pothole(5, 1000.0, 100.0)).unwrap();
    assert_eq!(
        outbound.recv_timeout(Duration::from_millis(200)),
        Err(RecvError::Timeout)
    );

    node.receive(pothole(6, 1005.0, 103.0)).unwrap();
    let envelope = outbound.recv_timeout(WAIT).unwrap();
    assert_eq!(envelope.origin_node, NodeId(1));
    let Payload::Ivim { situation } = envelope.payload else {
        panic!("expected IVIM, got {envelope}");
    };
    assert_eq!(situation.event_type, EventType::RoadSurfaceHazard);
    assert!((situation.confidence - 0.8).abs() < 1e-9);

    // A third reporter confirms but does not trigger another broadcast
    node.receive(pothole(7, 1001.0, 101.0)).unwrap();
    assert_eq!(
        outbound.recv_timeout(Duration::from_millis(200)),
        Err(RecvError::Timeout)
    );
    node.shutdown().unwrap();
}

#[test]
fn rsu_accepts_json_records_and_manual_situations() {
    let (node, mut outbound) = rsu_node(false);

    let severe = Envelope::den(
        NodeId(8),
        HazardEvent::new(EventType::VehicleBreakdown, Location::new(0.0, 0.0))
            .severity(4)
            .confidence(0.3),
    );
    node.receive(severe.to_json().unwrap()).unwrap();
    assert_eq!(outbound.recv_timeout(WAIT).unwrap().msg_type(), MsgType::Ivim);

    node.receive(r#"{"msg_type": "DEN", "node": 9}"#.to_owned())
        .unwrap();
    node.commands()
        .send(Command::ManualSituation(ManualSituation::Roadworks))
        .unwrap();
    let Payload::Ivim { situation } = outbound.recv_timeout(WAIT).unwrap().payload else {
        panic!("expected IVIM");
    };
    assert_eq!(situation.event_type, EventType::Roadworks);
    assert_eq!(situation.location, Some(Location::new(1000.0, 0.0)));
    node.shutdown().unwrap();
}

#[test]
fn rsu_publishes_one_spat_per_phase() {
    let (node, mut outbound) = rsu_node(true);
    let mut states = Vec::new();
    while states.len() < 3 {
        let envelope = outbound.recv_timeout(WAIT).unwrap();
        let Payload::Spat { intersection } = envelope.payload else {
            panic!("expected SPAT, got {envelope}");
        };
        states.push(intersection.signal_groups[&1].state);
    }
    assert_eq!(
        states,
        vec![LightState::Green, LightState::Yellow, LightState::Red]
    );
    node.shutdown().unwrap();
}

#[test]
fn obu_ignores_its_own_den() {
    let (node, actuator, _outbound) = obu_node(5);

    node.receive(pothole(5, 1000.0, 90.0)).unwrap();
    node.receive(pothole(6, 1000.0, 90.0)).unwrap();
    assert!(eventually(|| actuator.calls().len() == 4));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(
        actuator.calls(),
        vec![
            VehicleCommand::Open,
            VehicleCommand::TurnOn,
            VehicleCommand::MoveForward,
            VehicleCommand::SlowDown
        ]
    );
    node.shutdown().unwrap();
}

#[test]
fn obu_corroborates_roadworks() {
    let (node, _actuator, mut outbound) = obu_node(6);
    let situation = ManualSituation::Roadworks.situation(Location::new(0.0, 600.0));
    node.receive(Envelope::ivim(NodeId(2), situation)).unwrap();

    let envelope = outbound.recv_timeout(WAIT).unwrap();
    assert_eq!(envelope.origin_node, NodeId(6));
    let Payload::Den { event } = envelope.payload else {
        panic!("expected DEN");
    };
    assert_eq!(event.location, Location::new(0.0, 600.0));
    node.shutdown().unwrap();
}

/// Emits an IVIM for every message, panics on messages from node 0
struct Flaky;

impl Controller for Flaky {
    fn handle(&mut self, input: ControllerInput, emit: EmitSender) -> Result<(), Error> {
        match input {
            ControllerInput::Message(envelope) if envelope.origin_node == NodeId(0) => {
                panic!("cannot handle {envelope}")
            }
            _ => emit.send(EmitRequest::Ivim(
                ManualSituation::VehicleStopped.situation(Location::default()),
            )),
        }
    }
}

#[test]
fn controller_panic_does_not_stop_the_node() {
    init_logging();
    let (transport, mut outbound) = channel::<Envelope>();
    let timing = StageTiming {
        warm_up: Duration::ZERO,
        fault_backoff: Duration::from_millis(20),
    };
    let node = Node::spawn(NodeId(1), NodeKind::Rsu, Box::new(Flaky), transport, timing).unwrap();

    node.receive(pothole(0, 0.0, 0.0)).unwrap();
    node.receive(pothole(5, 0.0, 0.0)).unwrap();
    assert_eq!(outbound.recv_timeout(WAIT).unwrap().msg_type(), MsgType::Ivim);
    node.shutdown().unwrap();
}

#[test]
fn shutdown_is_prompt() {
    let (node, _outbound) = rsu_node(false);
    let start = Instant::now();
    node.shutdown().unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));

    let (node, _actuator, _outbound) = obu_node(7);
    let start = Instant::now();
    drop(node);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn stopped_node_refuses_input() {
    let (node, _outbound) = rsu_node(false);
    let inbound = node.inbound();
    node.shutdown().unwrap();
    let mut inbound = inbound;
    assert!(inbound.send(pothole(5, 0.0, 0.0).into()).is_err());
}
