// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Demo corridor: four signalled intersections and six vehicles connected by an in-process
//! radio. Two vehicles detect the same pothole, the nearby RSUs aggregate their reports and warn
//! all vehicles, and an operator announces bad weather at one intersection.

use anyhow::{anyhow, Context, Error};
use argh::FromArgs;
use log::{info, LevelFilter};
use std::thread;
use std::time::Duration;
use transport::Radio;
use v2x::configuration::node::Builder;
use v2x::prelude::*;
use v2x::queue::ShutdownFlag;

mod map;
mod transport;

#[derive(FromArgs)]
#[argh(help_triggers("-h", "--help", "help"))]
/// V2X corridor demo
struct Params {
    #[argh(description = "signal phase duration in milliseconds")]
    #[argh(option, short = 'p', default = "5000")]
    phase_ms: u64,

    #[argh(description = "run time in seconds")]
    #[argh(option, short = 'r', default = "30")]
    run_time: u64,

    #[argh(description = "log level")]
    #[argh(option, short = 'l')]
    log_level: Option<LevelFilter>,

    #[argh(description = "print tracing spans of the pipeline stages")]
    #[argh(switch, short = 't')]
    trace: bool,

    #[argh(description = "forward hazards again when their severity rises")]
    #[argh(switch)]
    rearm: bool,
}

fn main() -> Result<(), Error> {
    let params: Params = argh::from_env();

    v2x_logger::init(params.log_level.unwrap_or(LevelFilter::Info), true);
    if params.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_thread_names(true)
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
    }

    let interfaces = map::corridor();
    let mut radio = Radio::new(&interfaces);
    let mut policy = ForwardingPolicy::default();
    if params.rearm {
        policy = policy.with_rearm();
    }

    let mut nodes = Vec::with_capacity(interfaces.len());
    for interface in &interfaces {
        let id = interface.node_id;
        let mut builder = Builder::new(interface.clone());
        builder
            .phase_duration(Duration::from_millis(params.phase_ms))
            .forwarding(policy);
        let node = builder
            .build(radio.uplink())
            .with_context(|| format!("failed to start node {id}"))?;
        radio.attach(id, node.inbound());
        nodes.push(node);
    }

    let radio_shutdown = ShutdownFlag::new();
    let radio_thread = radio.spawn(radio_shutdown.clone())?;
    info!("Corridor with {} nodes running", nodes.len());

    script(&nodes)?;

    thread::sleep(Duration::from_secs(params.run_time));

    info!("Shutting down");
    for node in nodes {
        node.shutdown()?;
    }
    radio_shutdown.trigger();
    radio_thread
        .join()
        .map_err(|_| anyhow!("radio thread panicked"))?;
    Ok(())
}

/// Scripted events of the demo
fn script(nodes: &[Node]) -> Result<(), Error> {
    let node = |id: u32| {
        nodes
            .iter()
            .find(|n| n.id() == NodeId(id))
            .ok_or_else(|| anyhow!("no node {id} in the corridor"))
    };
    let pothole = |distance: f64| Command::ReportHazard {
        event_type: EventType::RoadSurfaceHazard,
        hazard_subtype: Some(HazardSubtype::Potholes),
        severity: 2,
        confidence: 0.4,
        distance,
    };

    thread::sleep(Duration::from_secs(1));
    // Both vehicles see the pothole at (1000, 25)
    node(5)?.commands().send(pothole(75.0))?;
    thread::sleep(Duration::from_millis(500));
    node(8)?.commands().send(pothole(0.0))?;

    thread::sleep(Duration::from_secs(2));
    node(2)?
        .commands()
        .send(Command::ManualSituation(ManualSituation::WeatherCondition))?;

    thread::sleep(Duration::from_secs(1));
    node(1)?.commands().send(Command::ListHazards)?;
    Ok(())
}
