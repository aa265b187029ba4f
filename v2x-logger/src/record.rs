// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use log::Level;
use std::time::SystemTime;

/// Log record as handed to the outputs
#[derive(Debug)]
pub struct Record<'a> {
    pub timestamp: SystemTime,
    pub level: Level,
    pub target: &'a str,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub tgid: u32,
    pub tid: u32,
    /// Name of the emitting thread, if it has one
    pub thread: Option<&'a str>,
    pub args: &'a str,
}

impl Record<'_> {
    /// Create a new record.
    #[allow(clippy::too_many_arguments)]
    pub fn new<'a>(
        timestamp: SystemTime,
        level: Level,
        target: &'a str,
        file: Option<&'a str>,
        line: Option<u32>,
        tgid: u32,
        tid: u32,
        thread: Option<&'a str>,
        args: &'a str,
    ) -> Record<'a> {
        Record {
            timestamp,
            level,
            target,
            file,
            line,
            tgid,
            tid,
            thread,
            args,
        }
    }
}
