// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Console logger for V2X nodes
//!
//! Implements the `log` facade. Every line carries a timestamp, the log target, process
//! and thread id and the thread name, so the stages of each node can be told apart.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::process;
use std::str::FromStr;
use std::time::SystemTime;

mod console;
pub mod fmt;
pub mod record;
mod thread;

const ENV_RUST_LOG: &str = "RUST_LOG";

/// Initialize the logger.
///
/// A valid level passed as `RUST_LOG` environment variable overrides `level`.
/// Enable output to `stdout` via `console`.
///
/// # Panics
///
/// Panics if a logger has been installed before
pub fn init(level: LevelFilter, console: bool) {
    try_init(level, console).expect("failed to set logger")
}

/// Initialize the logger unless another one is installed already
pub fn try_init(level: LevelFilter, console: bool) -> Result<(), SetLoggerError> {
    let logger = Logger::new(console);
    // Set the logger in the global subsystem.
    log::set_boxed_logger(Box::new(logger))?;
    // Set the maximum log level the log subsystem will forward to this logger impl.
    log::set_max_level(level_from_env().unwrap_or(level));
    Ok(())
}

/// The V2X logger.
#[derive(Debug)]
pub struct Logger {
    console: Option<console::Console>,
}

impl Logger {
    /// Create a new logger.
    pub fn new(console: bool) -> Self {
        let console = console.then(console::Console::default);
        Self { console }
    }
}

impl Log for Logger {
    /// Check if a log message with the specified metadata would be logged.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        let Some(console) = &self.console else {
            return;
        };
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = SystemTime::now();
        let tgid = process::id();
        let tid = thread::id();
        let thread_name = thread::name();
        let args = record.args().to_string();

        let record = record::Record::new(
            timestamp,
            record.level(),
            record.target(),
            record.file(),
            record.line(),
            tgid,
            tid,
            thread_name.as_deref(),
            &args,
        );

        // A closed stdout is not worth taking a node down for
        let _ = console.write(&record);
    }

    fn flush(&self) {}
}

/// Try to parse the log level from the environment variable `RUST_LOG`.
fn level_from_env() -> Option<LevelFilter> {
    std::env::var(ENV_RUST_LOG).ok().and_then(|s| {
        LevelFilter::from_str(&s)
            .inspect_err(|_| eprintln!("Failed to parse log level from `RUST_LOG={s}`"))
            .ok()
    })
}
