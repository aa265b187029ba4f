// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! In-process radio
//!
//! Collects everything the nodes publish and hands each message, encoded as a JSON record, to
//! every other node within radio range of its sender.

use crate::map;
use log::{debug, warn};
use std::collections::HashMap;
use std::thread;
use v2x::error::Error;
use v2x::message::Envelope;
use v2x::pipeline::Inbound;
use v2x::queue::{
    channel, IntraProcReceiver, IntraProcSender, Receiver, RecvError, Sender, ShutdownFlag,
};
use v2x::topology::{Location, NodeId, NodeInterface};

/// A node as seen by the radio
struct Station {
    location: Location,
    range: f64,
    inbound: Option<IntraProcSender<Inbound>>,
}

/// Loopback radio connecting the nodes of one process
pub struct Radio {
    stations: HashMap<NodeId, Station>,
    uplink: IntraProcSender<Envelope>,
    air: IntraProcReceiver<Envelope>,
}

impl Radio {
    /// Radio covering the given nodes
    pub fn new(nodes: &[NodeInterface]) -> Self {
        let stations = nodes
            .iter()
            .map(|node| {
                let station = Station {
                    location: node.location(),
                    range: map::range(node.kind),
                    inbound: None,
                };
                (node.node_id, station)
            })
            .collect();
        let (uplink, air) = channel();
        Self {
            stations,
            uplink,
            air,
        }
    }

    /// Sender a node publishes into
    pub fn uplink(&self) -> IntraProcSender<Envelope> {
        self.uplink.clone()
    }

    /// Register where messages for `node` are delivered
    pub fn attach(&mut self, node: NodeId, inbound: IntraProcSender<Inbound>) {
        if let Some(station) = self.stations.get_mut(&node) {
            station.inbound = Some(inbound);
        }
    }

    /// Run the radio on its own thread until `shutdown` is raised
    pub fn spawn(mut self, shutdown: ShutdownFlag) -> Result<thread::JoinHandle<()>, Error> {
        self.air.attach(shutdown);
        thread::Builder::new()
            .name("v2x-radio".into())
            .spawn(move || self.run())
            .map_err(|e| Error::Fault(format!("could not spawn radio: {e}")))
    }

    fn run(mut self) {
        loop {
            match self.air.recv() {
                Ok(envelope) => self.broadcast(&envelope),
                Err(RecvError::Shutdown) => break,
                Err(RecvError::Timeout) => continue,
            }
        }
        debug!("Radio stopped");
    }

    fn broadcast(&mut self, envelope: &Envelope) {
        let Some(origin) = self.stations.get(&envelope.origin_node) else {
            warn!("Radio drops {envelope}: unknown sender");
            return;
        };
        let (from, range) = (origin.location, origin.range);
        let record = match envelope.to_json() {
            Ok(record) => record,
            Err(e) => {
                warn!("Radio drops {envelope}: {e}");
                return;
            }
        };

        for (id, station) in self.stations.iter_mut() {
            if *id == envelope.origin_node || station.location.distance_to(&from) > range {
                continue;
            }
            if let Some(inbound) = station.inbound.as_mut() {
                // Stopped nodes simply miss the message
                let _ = inbound.send(Inbound::Record(record.clone()));
            }
        }
    }
}
