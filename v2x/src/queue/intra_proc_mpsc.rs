// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::{Receiver, RecvError, Sender, ShutdownFlag, SHUTDOWN_POLL};
use crate::error::Error;
use crate::error::Error::Channel;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

pub fn channel<T>() -> (IntraProcSender<T>, IntraProcReceiver<T>) {
    let (sender, receiver) = mpsc::channel();
    (
        IntraProcSender::new(sender),
        IntraProcReceiver::new(receiver),
    )
}

pub struct IntraProcReceiver<T> {
    receiver: mpsc::Receiver<T>,
    shutdown: Option<ShutdownFlag>,
}

impl<T> IntraProcReceiver<T> {
    pub fn new(mpsc_rec: mpsc::Receiver<T>) -> IntraProcReceiver<T> {
        IntraProcReceiver {
            receiver: mpsc_rec,
            shutdown: None,
        }
    }

    /// Make blocking receives return [RecvError::Shutdown] once `flag` is raised
    pub fn attach(&mut self, flag: ShutdownFlag) {
        self.shutdown = Some(flag);
    }

    /// Take the next item if one is already queued
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.as_ref().is_some_and(ShutdownFlag::is_set)
    }
}

impl<T: Send> Receiver<T> for IntraProcReceiver<T> {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<T, RecvError> {
        // `None` means the timeout is too large to represent, i.e. wait forever
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if self.is_shutdown() {
                return Err(RecvError::Shutdown);
            }

            let slice = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(RecvError::Timeout);
                    }
                    left.min(SHUTDOWN_POLL)
                }
                None => SHUTDOWN_POLL,
            };

            // Wake up at least every SHUTDOWN_POLL to look at the shutdown flag
            match self.receiver.recv_timeout(slice) {
                Ok(t) => return Ok(t),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(RecvError::Shutdown),
            }
        }
    }
}

pub struct IntraProcSender<T> {
    sender: mpsc::Sender<T>,
}

impl<T> IntraProcSender<T> {
    pub fn new(mpsc_snd: mpsc::Sender<T>) -> IntraProcSender<T> {
        IntraProcSender { sender: mpsc_snd }
    }
}

impl<T> Clone for IntraProcSender<T> {
    fn clone(&self) -> IntraProcSender<T> {
        IntraProcSender {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Send> Sender<T> for IntraProcSender<T> {
    fn send(&mut self, t: T) -> Result<()> {
        self.sender
            .send(t)
            .map_err(|_| Channel("failed to send, receiver is gone"))
    }
}

type Result<T, E = Error> = std::result::Result<T, E>;
