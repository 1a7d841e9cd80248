//! `Communicator`: the trait boundary a real MPI binding would implement.
//! `LocalCommunicator` is the only implementation, modeling every rank as a
//! slot in one process and moving ghost buffers with plain `Vec<f64>` copies
//! in deterministic (sender, receiver) pair order.

use cfd_core::error::{Result, TransientError};

/// A pending non-blocking send/receive the caller must eventually `wait` on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub u64);

/// The message-passing boundary `cfd-parallel` drives ghost exchange and
/// collectives through. A real MPI binding would implement this over
/// `MPI_Isend`/`MPI_Irecv`/`MPI_Allreduce`; `LocalCommunicator` performs the
/// equivalent synchronous copies in-process.
pub trait Communicator {
    /// Post a non-blocking send of `payload` from `from_rank` to `to_rank`,
    /// tagged with `patch_id` so the receiver can match it. Returns a handle
    /// to `wait` on.
    fn isend(&mut self, patch_id: u32, from_rank: u32, to_rank: u32, payload: Vec<f64>) -> RequestId;

    /// Post a non-blocking receive matching a prior `isend` with the same
    /// `patch_id`/`from_rank`/`to_rank`. Returns a handle to `wait` on.
    fn irecv(&mut self, patch_id: u32, from_rank: u32, to_rank: u32) -> RequestId;

    /// Block until `request` completes, returning the received payload for
    /// an `irecv` request (empty for a completed `isend`).
    fn wait(&mut self, request: RequestId) -> Result<Vec<f64>>;

    /// Collective synchronization point with no payload.
    fn barrier(&mut self);
}

#[derive(Clone, Debug)]
enum PendingMessage {
    InFlight { patch_id: u32, from_rank: u32, to_rank: u32, payload: Vec<f64> },
    Delivered,
}

/// In-process `Communicator`. Sends are buffered until the matching receive
/// is posted; `wait` on a receive request pops the matched payload.
#[derive(Default)]
pub struct LocalCommunicator {
    next_request: u64,
    mailbox: Vec<PendingMessage>,
    pending_recv: std::collections::HashMap<u64, (u32, u32, u32)>,
}

impl LocalCommunicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_request(&mut self) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        RequestId(id)
    }
}

impl Communicator for LocalCommunicator {
    fn isend(&mut self, patch_id: u32, from_rank: u32, to_rank: u32, payload: Vec<f64>) -> RequestId {
        let req = self.fresh_request();
        self.mailbox.push(PendingMessage::InFlight { patch_id, from_rank, to_rank, payload });
        tracing::trace!(patch_id, from_rank, to_rank, bytes = self.mailbox.len(), "isend posted");
        req
    }

    fn irecv(&mut self, patch_id: u32, from_rank: u32, to_rank: u32) -> RequestId {
        let req = self.fresh_request();
        self.pending_recv.insert(req.0, (patch_id, from_rank, to_rank));
        req
    }

    fn wait(&mut self, request: RequestId) -> Result<Vec<f64>> {
        if let Some((patch_id, from_rank, to_rank)) = self.pending_recv.remove(&request.0) {
            let slot = self.mailbox.iter_mut().position(|m| {
                matches!(m, PendingMessage::InFlight { patch_id: p, from_rank: f, to_rank: t, .. }
                    if *p == patch_id && *f == from_rank && *t == to_rank)
            });
            return match slot {
                Some(idx) => {
                    let payload = match std::mem::replace(&mut self.mailbox[idx], PendingMessage::Delivered) {
                        PendingMessage::InFlight { payload, .. } => payload,
                        PendingMessage::Delivered => unreachable!(),
                    };
                    Ok(payload)
                }
                None => Err(TransientError::MessageLost { patch_id, from: from_rank, to: to_rank }.into()),
            };
        }
        Ok(Vec::new())
    }

    fn barrier(&mut self) {}
}
