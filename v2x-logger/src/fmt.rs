// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::record::Record;
use console::{style, Color, StyledObject};
use log::Level;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

static TARGET_SIZE: AtomicUsize = AtomicUsize::new(16);
static THREAD_SIZE: AtomicUsize = AtomicUsize::new(10);
static TGID_SIZE: AtomicUsize = AtomicUsize::new(4);
static TID_SIZE: AtomicUsize = AtomicUsize::new(4);

/// Write `record` as one line:
/// `HH:MM:SS.mmm <target> (<pid> <tid> <thread>): LEVEL: message`
pub fn format<W: io::Write>(record: &Record, mut writer: W) -> io::Result<()> {
    let timestamp = OffsetDateTime::from(record.timestamp)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let level = {
        let level_color = match record.level {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Color256(243),
            Level::Trace => Color::White,
        };
        style(record.level).bold().fg(level_color)
    };

    let tgid = format_id(record.tgid, &TGID_SIZE, true);
    let tid = format_id(record.tid, &TID_SIZE, false);
    let target = padded(record.target, &TARGET_SIZE);
    let thread = padded(record.thread.unwrap_or("-"), &THREAD_SIZE);
    let message = record.args;

    // Log location on trace level - otherwise just the message.
    if record.level == Level::Trace {
        let file = record.file.unwrap_or("file unknown");
        let file = style(file).fg(file.color());
        let line = record.line.unwrap_or(0);
        writeln!(
            writer,
            "{timestamp} {target} ({tgid} {tid} {thread}): {level:<5}: {file}:{line}: {message}",
        )
    } else {
        writeln!(
            writer,
            "{timestamp} {target} ({tgid} {tid} {thread}): {level:<5}: {message}"
        )
    }
}

/// Pad `text` to the widest text seen so far in this column, colored by its hash
fn padded(text: &str, width: &AtomicUsize) -> StyledObject<String> {
    width.fetch_max(text.len(), Ordering::Relaxed);
    let width = width.load(Ordering::Relaxed);
    style(format!("{text:<width$}")).fg(text.color())
}

/// Generate a color of `self`.
trait HashColor {
    fn color(&self) -> Color;
}

impl HashColor for &str {
    fn color(&self) -> Color {
        let hash = self.bytes().fold(42u8, |c, x| c ^ x);
        (hash as u64).color()
    }
}

impl HashColor for u32 {
    fn color(&self) -> Color {
        (*self as u64).color()
    }
}

impl HashColor for u64 {
    fn color(&self) -> Color {
        // Skip colors that are hard to read on dark terminals
        let color = match *self as u8 {
            c @ 0..=1 => c + 2,
            c @ 16..=21 => c + 6,
            c @ 52..=55 | c @ 126..=129 => c + 4,
            c @ 163..=165 | c @ 200..=201 => c + 3,
            c @ 207 => c + 1,
            c @ 232..=240 => c + 9,
            c => c,
        };
        Color::Color256(color)
    }
}

/// Format `id` with a color based on the hash of `id`. Update `g` with the
/// maximum length of the formatted `id`.
fn format_id(id: u32, g: &AtomicUsize, align_left: bool) -> StyledObject<String> {
    let id_len = num_hex_digits(id);
    let color = id.color();
    g.fetch_max(id_len, Ordering::Relaxed);
    let len = g.load(Ordering::Relaxed);
    if align_left {
        style(format!("{:<l$x}", id, l = len)).fg(color)
    } else {
        style(format!("{:>l$x}", id, l = len)).fg(color)
    }
}

// Calculate the number of hex digits needed to represent `n`.
fn num_hex_digits(n: u32) -> usize {
    (1 + n.checked_ilog2().unwrap_or_default() / 4) as usize
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn hex_digits() {
        assert_eq!(num_hex_digits(0), 1);
        assert_eq!(num_hex_digits(15), 1);
        assert_eq!(num_hex_digits(16), 2);
        assert_eq!(num_hex_digits(256), 3);
    }

    #[test]
    fn line_layout() {
        console::set_colors_enabled(false);
        let record = Record::new(
            SystemTime::UNIX_EPOCH + Duration::from_millis(3_723_456),
            Level::Warn,
            "v2x::rsu::controller",
            Some("v2x/src/rsu/controller.rs"),
            Some(7),
            0x1a,
            0x2b,
            Some("v2x-n1-ctl"),
            "record #3 forwarded",
        );
        let mut out = Vec::new();
        format(&record, &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("01:02:03.456 v2x::rsu::controller"));
        assert!(line.contains("v2x-n1-ctl"));
        assert!(line.contains("WARN : record #3 forwarded"));
        assert!(line.ends_with('\n'));
        assert!(!line.contains("controller.rs"));
    }

    #[test]
    fn trace_shows_location() {
        console::set_colors_enabled(false);
        let record = Record::new(
            SystemTime::UNIX_EPOCH,
            Level::Trace,
            "v2x",
            Some("v2x/src/lib.rs"),
            Some(42),
            1,
            2,
            None,
            "tick",
        );
        let mut out = Vec::new();
        format(&record, &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.contains("v2x/src/lib.rs:42: tick"));
    }
}
