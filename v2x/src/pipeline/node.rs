// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::controller::{self, Command, Controller, ControllerInput, StageTiming};
use super::emit::{self, EmitRequest};
use super::receive::{self, Classifier, Inbound};
use crate::error::Error;
use crate::message::Envelope;
use crate::queue::{channel, IntraProcSender, Sender, ShutdownFlag};
use crate::topology::{NodeId, NodeKind};
use log::{debug, error};
use std::fmt::Display;
use std::thread;

/// Pipeline stage of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Receive,
    Controller,
    Emit,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Receive => write!(f, "rx"),
            Role::Controller => write!(f, "ctl"),
            Role::Emit => write!(f, "tx"),
        }
    }
}

/// A stage thread
struct Stage {
    role: Role,
    thread: thread::JoinHandle<()>,
}

impl Stage {
    /// Spawn `f` on a thread named after node and role
    fn spawn<F>(node: NodeId, role: Role, f: F) -> Result<Stage, Error>
    where
        F: FnOnce() + Send + 'static,
    {
        let thread_name = format!("v2x-{node}-{role}").to_lowercase();
        let thread = thread::Builder::new()
            .name(thread_name)
            .spawn(f)
            .map_err(|e| Error::Fault(format!("could not spawn {role} thread of {node}: {e}")))?;
        Ok(Stage { role, thread })
    }
}

/// Sender of commands into a node's controller queue
#[derive(Clone)]
pub struct CommandSender(IntraProcSender<ControllerInput>);

impl Sender<Command> for CommandSender {
    fn send(&mut self, command: Command) -> Result<(), Error> {
        self.0.send(ControllerInput::Command(command))
    }
}

/// A running node: receive, controller and emit stage
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    inbound: IntraProcSender<Inbound>,
    commands: IntraProcSender<ControllerInput>,
    shutdown: ShutdownFlag,
    stages: Vec<Stage>,
}

impl Node {
    /// Start the stages of a node. Published messages go to `transport`.
    pub fn spawn<S>(
        id: NodeId,
        kind: NodeKind,
        controller: Box<dyn Controller>,
        transport: S,
        timing: StageTiming,
    ) -> Result<Node, Error>
    where
        S: Sender<Envelope> + 'static,
    {
        let shutdown = ShutdownFlag::new();
        let (inbound, mut inbound_rx) = channel::<Inbound>();
        let (commands, mut controller_rx) = channel::<ControllerInput>();
        let (emit_tx, mut emit_rx) = channel::<EmitRequest>();
        inbound_rx.attach(shutdown.clone());
        controller_rx.attach(shutdown.clone());
        emit_rx.attach(shutdown.clone());

        let mut node = Node {
            id,
            kind,
            inbound,
            commands,
            shutdown: shutdown.clone(),
            stages: Vec::with_capacity(3),
        };

        // Stages already spawned are stopped by dropping the node if a later spawn fails
        node.stages.push(Stage::spawn(id, Role::Emit, move || {
            emit::run(id, emit_rx, transport)
        })?);

        let flag = shutdown.clone();
        node.stages.push(Stage::spawn(id, Role::Controller, move || {
            controller::run(id, controller, controller_rx, emit_tx, timing, flag)
        })?);

        let classifier = Classifier::new(id, kind);
        let controller_tx = node.commands.clone();
        node.stages.push(Stage::spawn(id, Role::Receive, move || {
            receive::run(classifier, inbound_rx, controller_tx)
        })?);

        debug!("Node {id} ({kind}) started");
        Ok(node)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Entry point of the transport: queue a message for the receive stage
    pub fn receive(&self, item: impl Into<Inbound>) -> Result<(), Error> {
        self.inbound.clone().send(item.into())
    }

    /// Sender feeding the receive stage, for transports running on their own thread
    pub fn inbound(&self) -> IntraProcSender<Inbound> {
        self.inbound.clone()
    }

    /// Sender for the node's control surfaces
    pub fn commands(&self) -> CommandSender {
        CommandSender(self.commands.clone())
    }

    /// Stop all stages and wait for them
    pub fn shutdown(mut self) -> Result<(), Error> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.shutdown.trigger();
        let mut result = Ok(());
        for stage in self.stages.drain(..) {
            if stage.thread.join().is_err() {
                error!("Stage {} of node {} panicked", stage.role, self.id);
                result = Err(Error::Fault(format!(
                    "stage {} of node {} panicked",
                    stage.role, self.id
                )));
            }
        }
        if result.is_ok() {
            debug!("Node {} stopped", self.id);
        }
        result
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if !self.stages.is_empty() {
            // Errors have been logged already
            let _ = self.stop();
        }
    }
}
