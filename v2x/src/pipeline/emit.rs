// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Emit stage: publishes the artifacts queued by the controller

use crate::message::den::HazardEvent;
use crate::message::ivim::Situation;
use crate::message::spat::Intersection;
use crate::message::Envelope;
use crate::queue::{Receiver, RecvError, Sender};
use crate::topology::NodeId;
use log::{debug, warn};
use tracing::{span, Level};

/// Outbound artifact queued by a controller
#[derive(Debug, Clone, PartialEq)]
pub enum EmitRequest {
    Den(HazardEvent),
    Ivim(Situation),
    Spat(Intersection),
}

impl EmitRequest {
    /// Wrap into a message authored by `node`
    pub fn into_envelope(self, node: NodeId) -> Envelope {
        match self {
            EmitRequest::Den(event) => Envelope::den(node, event),
            EmitRequest::Ivim(situation) => Envelope::ivim(node, situation),
            EmitRequest::Spat(intersection) => Envelope::spat(node, intersection),
        }
    }
}

/// Emit stage main function
pub(crate) fn run<R, S>(node: NodeId, mut requests: R, mut transport: S)
where
    R: Receiver<EmitRequest>,
    S: Sender<Envelope>,
{
    loop {
        let request = match requests.recv() {
            Ok(request) => request,
            Err(RecvError::Shutdown) => break,
            Err(RecvError::Timeout) => continue,
        };

        let envelope = request.into_envelope(node);
        let _span = span!(Level::DEBUG, "Emit", node = %node, msg = %envelope).entered();
        debug!("Node {node} publishes {}", envelope.msg_type());
        // Fire and forget: a missing transport only costs this message
        if let Err(e) = transport.send(envelope) {
            warn!("Node {node} could not publish: {e}");
        }
    }
    debug!("Emit stage of node {node} stopped");
}
