// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::fmt;
use crate::record::Record;
use std::io::{self, Write};

/// Writes records to stdout, one line per record
#[derive(Debug, Default)]
pub struct Console;

impl Console {
    pub fn write(&self, record: &Record) -> io::Result<()> {
        // Lock once so lines of concurrent stages do not interleave
        let mut stdout = io::stdout().lock();
        fmt::format(record, &mut stdout)?;
        stdout.flush()
    }
}
