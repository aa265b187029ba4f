// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Ordered queues connecting the pipeline stages of one node.
//!
//! Every queue is unbounded, preserves submission order and can be waited on with a timeout.
//! A receiver attached to a [ShutdownFlag] returns [RecvError::Shutdown] shortly after the
//! flag has been raised, even while blocked.

mod interface;
mod intra_proc_mpsc;
mod shutdown;

pub use interface::{Receiver, RecvError, Sender};
pub use intra_proc_mpsc::{channel, IntraProcReceiver, IntraProcSender};
pub use shutdown::{ShutdownFlag, SHUTDOWN_POLL};
