// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Receive stage: classifies inbound messages and forwards the accepted ones

use super::controller::ControllerInput;
use crate::message::{Envelope, Payload};
use crate::queue::{Receiver, RecvError, Sender};
use crate::topology::{NodeId, NodeKind};
use log::{debug, info, warn};
use tracing::{span, Level};

/// Item delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// An already decoded message
    Message(Envelope),
    /// A logical JSON record still to be decoded
    Record(String),
}

impl From<Envelope> for Inbound {
    fn from(envelope: Envelope) -> Self {
        Inbound::Message(envelope)
    }
}

impl From<String> for Inbound {
    fn from(record: String) -> Self {
        Inbound::Record(record)
    }
}

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand over to the controller
    Forward,
    /// Awareness traffic, consumed without decision
    Consume,
    /// Not meant for this node
    SelfAuthored,
    /// Type this role does not expect
    Unexpected,
}

/// Per-role message filter
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    node: NodeId,
    kind: NodeKind,
}

impl Classifier {
    pub fn new(node: NodeId, kind: NodeKind) -> Self {
        Self { node, kind }
    }

    pub fn classify(&self, envelope: &Envelope) -> Verdict {
        match (self.kind, &envelope.payload) {
            (_, Payload::Ca(_)) => Verdict::Consume,
            (NodeKind::Obu, Payload::Den { .. }) if envelope.origin_node == self.node => {
                Verdict::SelfAuthored
            }
            (NodeKind::Obu, Payload::Den { .. } | Payload::Ivim { .. } | Payload::Spat { .. }) => {
                Verdict::Forward
            }
            (NodeKind::Rsu, Payload::Den { .. }) => Verdict::Forward,
            (NodeKind::Rsu, Payload::Ivim { .. } | Payload::Spat { .. }) => Verdict::Unexpected,
            (NodeKind::Au, _) => Verdict::Unexpected,
        }
    }
}

/// Receive stage main function
pub(crate) fn run<R, S>(classifier: Classifier, mut inbound: R, mut controller: S)
where
    R: Receiver<Inbound>,
    S: Sender<ControllerInput>,
{
    let node = classifier.node;
    loop {
        let item = match inbound.recv() {
            Ok(item) => item,
            Err(RecvError::Shutdown) => break,
            Err(RecvError::Timeout) => continue,
        };

        let envelope = match item {
            Inbound::Message(envelope) => envelope,
            Inbound::Record(json) => match Envelope::from_json(&json) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("Node {node} discards record: {e}");
                    continue;
                }
            },
        };

        let _span = span!(Level::DEBUG, "Receive", node = %node, msg = %envelope).entered();
        match classifier.classify(&envelope) {
            Verdict::Forward => {
                if let Err(e) = controller.send(ControllerInput::Message(envelope)) {
                    debug!("Node {node} receive stage stops: {e}");
                    break;
                }
            }
            Verdict::Consume => debug!("Node {node} consumed {envelope}"),
            Verdict::SelfAuthored => debug!("Node {node} ignores its own {envelope}"),
            Verdict::Unexpected => info!("Node {node} discards unexpected {envelope}"),
        }
    }
    debug!("Receive stage of node {node} stopped");
}
