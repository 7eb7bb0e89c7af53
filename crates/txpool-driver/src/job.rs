// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

//! Job payloads and the dual-lane queue that carries them to the worker.
//!
//! Each `Job` variant is a tagged record carrying its input plus (for
//! request/reply jobs) a `crossbeam_channel::Sender` the worker replies
//! through; fire-and-forget jobs like `SetBaseFee` and `Abort` carry none.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Select, Sender};
use ethereum_types::{Address, H256, U256};
use txpool_core::{ItemRef, PoolTransaction, RejectReason, Status};

/// Upper bound (inclusive) of the job-id ring; ids wrap back to `1` past
/// this rather than overflowing.
pub const TX_JOB_ID_MAX: u32 = 999_999;

/// A monotonically increasing job identifier, 1-indexed, wrapping at
/// `TX_JOB_ID_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u32);

impl JobId {
    /// The raw numeric id.
    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
struct JobIdRing(AtomicU32);

impl JobIdRing {
    fn next(&self) -> JobId {
        let prev = self.0.fetch_add(1, Ordering::AcqRel);
        JobId((prev % TX_JOB_ID_MAX) + 1)
    }
}

/// One request to the `Driver`, matching a row of the external job table.
pub enum Job<T: PoolTransaction> {
    /// Import a batch of transactions; replies with one result per input,
    /// aligned by position. Each element is rejected with a `RejectReason`
    /// either by the pool's own admission policy (count/per-sender caps,
    /// minimum gas price — checked before the item ever reaches
    /// `TxTabs::insert`) or by `insert` itself (`AlreadyKnown`,
    /// `InvalidSender`).
    AddTxs {
        batch: Vec<(T, bool, Status, String)>,
        reply: Sender<Vec<Result<H256, RejectReason>>>,
    },
    /// Evict remote transactions older than the pool's configured lifetime;
    /// replies with the count deleted.
    EvictionInactive { reply: Sender<usize> },
    /// Replies with every address holding at least one item in the given
    /// locality.
    GetAccounts { local: bool, reply: Sender<BTreeSet<Address>> },
    /// Replies with the current base fee, or `None` if unset.
    GetBaseFee { reply: Sender<Option<U256>> },
    /// Sets (or clears, with `None`) the base fee used to compute
    /// effective tips.
    SetBaseFee { new_base_fee: Option<U256> },
    /// Replies with the pool's configured minimum gas price.
    GetGasPrice { reply: Sender<U256> },
    /// Updates the minimum gas price and drops every remote below it;
    /// replies with the count dropped.
    SetGasPrice { value: U256, reply: Sender<usize> },
    /// Replies with the item for a hash, if still present.
    GetItem { hash: H256, reply: Sender<Option<Arc<ItemRef<T>>>> },
    /// Replies with `(local, remote)` counts.
    LocusCount { reply: Sender<(usize, usize)> },
    /// Moves every remote item of one sender to local; replies with the
    /// count moved.
    MoveRemoteToLocals { address: Address, reply: Sender<usize> },
    /// Replies with `(pending, queued)` counts.
    StatsReport { reply: Sender<(usize, usize)> },
    /// Hard-removes an item, recording the given reason in the wastebasket.
    Reject { hash: H256, reason: RejectReason },
    /// Priority job: drains the queue and stops the worker. In-flight jobs
    /// complete; this one carries no reply.
    Abort,
}

/// Dual-lane job queue: a priority lane that jumps the head, and a regular
/// lane that appends to the tail. The worker drains the priority lane to
/// empty before taking one regular job.
pub struct JobQueue<T: PoolTransaction> {
    priority_tx: Sender<Job<T>>,
    priority_rx: Receiver<Job<T>>,
    regular_tx: Sender<Job<T>>,
    regular_rx: Receiver<Job<T>>,
    ids: JobIdRing,
}

impl<T: PoolTransaction> JobQueue<T> {
    pub fn new() -> Self {
        let (priority_tx, priority_rx) = unbounded();
        let (regular_tx, regular_rx) = unbounded();
        JobQueue {
            priority_tx,
            priority_rx,
            regular_tx,
            regular_rx,
            ids: JobIdRing::default(),
        }
    }

    /// A cloneable submission handle for the (possibly cross-thread) side
    /// that feeds this queue.
    pub fn handle(&self) -> JobHandle<T> {
        JobHandle {
            priority: self.priority_tx.clone(),
            regular: self.regular_tx.clone(),
        }
    }

    /// Allocates the next job id from the ring, for callers that want to
    /// track replies by id.
    pub fn next_id(&self) -> JobId {
        self.ids.next()
    }

    /// Blocks until a job is available, preferring the priority lane.
    /// Re-checks the priority lane after every wakeup so a priority job
    /// submitted while we were blocked on the regular lane still jumps
    /// ahead of whatever woke us.
    pub(crate) fn pop(&self) -> Option<Job<T>> {
        loop {
            if let Ok(job) = self.priority_rx.try_recv() {
                return Some(job);
            }

            let mut select = Select::new();
            select.recv(&self.priority_rx);
            let regular_idx = select.recv(&self.regular_rx);
            let ready = match select.ready_timeout(std::time::Duration::from_millis(250)) {
                Ok(index) => index,
                Err(_) => continue,
            };

            if let Ok(job) = self.priority_rx.try_recv() {
                return Some(job);
            }
            if ready == regular_idx {
                if let Ok(job) = self.regular_rx.try_recv() {
                    return Some(job);
                }
            }
        }
    }
}

impl<T: PoolTransaction> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable submission side of a `JobQueue`, safe to hand to other
/// threads (RPC handlers, sync) while the worker alone owns the receiving
/// side.
#[derive(Clone)]
pub struct JobHandle<T: PoolTransaction> {
    priority: Sender<Job<T>>,
    regular: Sender<Job<T>>,
}

impl<T: PoolTransaction> JobHandle<T> {
    /// Appends to the regular lane's tail.
    pub fn submit(&self, job: Job<T>) -> Result<(), crate::error::JobError> {
        self.regular.send(job).map_err(|_| crate::error::JobError::QueueShutdown)
    }

    /// Jumps the regular lane: delivered before any currently queued
    /// regular job, but never preempts a job already being handled.
    pub fn submit_priority(&self, job: Job<T>) -> Result<(), crate::error::JobError> {
        self.priority.send(job).map_err(|_| crate::error::JobError::QueueShutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_ring_wraps_at_max() {
        let ring = JobIdRing::default();
        for expected in 1..=TX_JOB_ID_MAX {
            assert_eq!(ring.next().get(), expected);
        }
        assert_eq!(ring.next().get(), 1);
    }
}
