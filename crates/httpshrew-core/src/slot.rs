//! One-shot response slot
//!
//! Each submitted request gets a fresh slot. The writing half is consumed by
//! its only write, so a worker cannot deliver two responses for one task.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Create a connected (writer, reader) pair.
pub fn response_slot() -> (ResponseSlot, PendingResponse) {
    let (sender, receiver) = bounded(1);
    (ResponseSlot { sender }, PendingResponse { receiver })
}

/// Writing half, owned by the worker processing the task.
#[derive(Debug)]
pub struct ResponseSlot {
    sender: Sender<Vec<u8>>,
}

impl ResponseSlot {
    /// Deliver the response. Returns `false` if the waiting side is gone,
    /// e.g. after its timeout expired.
    pub fn fill(self, response: Vec<u8>) -> bool {
        self.sender.send(response).is_ok()
    }
}

/// Reading half, held by the caller waiting for the response.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: Receiver<Vec<u8>>,
}

impl PendingResponse {
    /// Block until the slot is filled.
    ///
    /// Returns `None` only if the writing half was dropped without a write.
    pub fn wait(self) -> Option<Vec<u8>> {
        self.receiver.recv().ok()
    }

    /// Block for at most `timeout`; gives the pending response back on expiry.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Vec<u8>, SlotWait> {
        match self.receiver.recv_timeout(timeout) {
            Ok(response) => Ok(response),
            Err(RecvTimeoutError::Timeout) => Err(SlotWait::TimedOut(self)),
            Err(RecvTimeoutError::Disconnected) => Err(SlotWait::Abandoned),
        }
    }

    /// Non-blocking check, used by tests to assert a slot is still empty.
    pub fn try_take(&self) -> Option<Vec<u8>> {
        self.receiver.try_recv().ok()
    }
}

/// Outcome of [`PendingResponse::wait_timeout`] when no response arrived.
#[derive(Debug)]
pub enum SlotWait {
    TimedOut(PendingResponse),
    Abandoned,
}
