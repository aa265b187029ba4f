// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;
use std::fmt::Display;
use std::time::Duration;

/// Outcome of a receive that did not yield an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// Nothing arrived before the timeout elapsed
    Timeout,
    /// The node is shutting down or every producer has gone away
    Shutdown,
}

impl Display for RecvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecvError::Timeout => write!(f, "receive timed out"),
            RecvError::Shutdown => write!(f, "queue shut down"),
        }
    }
}

impl From<RecvError> for Error {
    fn from(e: RecvError) -> Self {
        match e {
            RecvError::Timeout => Error::Channel("receive timed out"),
            RecvError::Shutdown => Error::Shutdown,
        }
    }
}

pub trait Receiver<T>: Send {
    /// Wait at most `timeout` for the next item
    fn recv_timeout(&mut self, timeout: Duration) -> Result<T, RecvError>;

    /// Wait for the next item until shutdown
    fn recv(&mut self) -> Result<T, RecvError> {
        loop {
            match self.recv_timeout(Duration::MAX) {
                Err(RecvError::Timeout) => continue,
                other => return other,
            }
        }
    }
}

pub trait Sender<T>: Send {
    fn send(&mut self, t: T) -> Result<(), Error>;
}
