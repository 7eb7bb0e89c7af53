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

//! `Driver`: the single worker that owns one `TxTabs` and processes jobs to
//! completion with no internal retries, matching the "every public
//! operation is a critical section" contract `TxTabs` relies on.

use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;
use trace_time::trace_time;
use txpool_core::{PoolTransaction, RejectReason, TxTabs};

use crate::{
    job::{Job, JobHandle, JobQueue},
    options::Options,
};

/// Owns the pool and the job queue's receiving side. `TxTabs` itself holds
/// no lock; the `RwLock` wrapper exists solely so `snapshot()` can hand out
/// a read-only escape hatch to threads that don't want to round-trip
/// through a job (§5's "single reader-writer lock wrapping the whole
/// TxTabs").
pub struct Driver<T: PoolTransaction> {
    tabs: Arc<RwLock<TxTabs<T>>>,
    queue: JobQueue<T>,
    options: Options,
}

impl<T: PoolTransaction> Driver<T> {
    /// Builds a driver with an empty pool and returns a submission handle
    /// for the queue it now owns.
    pub fn new(options: Options) -> (Self, JobHandle<T>) {
        let queue = JobQueue::new();
        let handle = queue.handle();
        let tabs = Arc::new(RwLock::new(TxTabs::new(options.max_rejects)));
        (Driver { tabs, queue, options }, handle)
    }

    /// A cloneable read-only snapshot handle, for readers outside the
    /// worker that accept the reader-writer-lock escape hatch instead of
    /// submitting a job.
    pub fn snapshot(&self) -> Arc<RwLock<TxTabs<T>>> {
        self.tabs.clone()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Drains jobs until an `Abort` job is received or the queue is
    /// dropped. `now` supplies the wall-clock timestamp for jobs that need
    /// one (`AddTxs`, `EvictionInactive`) — the worker itself never reads a
    /// clock, keeping it deterministic to drive from tests.
    pub fn run(&mut self, now: impl Fn() -> u64) {
        while let Some(job) = self.queue.pop() {
            trace!(target: "txqueue", "dispatching job");
            if self.dispatch(job, &now) {
                debug!(target: "txqueue", "worker stopped on Abort");
                break;
            }
        }
    }

    /// Handles one job; returns `true` if the worker should stop (`Abort`).
    fn dispatch(&mut self, job: Job<T>, now: &impl Fn() -> u64) -> bool {
        trace_time!("driver::dispatch");
        match job {
            Job::AddTxs { batch, reply } => {
                let ts = now();
                let mut tabs = self.tabs.write();
                let results: Vec<_> = batch
                    .into_iter()
                    .map(|(tx, local, status, info)| match policy_check(&tabs, &self.options, &tx, local) {
                        Some(reason) => Err(reason),
                        None => tabs.insert(tx, local, status, info, ts).map_err(RejectReason::from),
                    })
                    .collect();
                drop(tabs);
                let _ = reply.send(results);
            }
            Job::EvictionInactive { reply } => {
                let ts = now();
                let deleted = self.tabs.write().evict_inactive(ts, self.options.lifetime_ms);
                let _ = reply.send(deleted);
            }
            Job::GetAccounts { local, reply } => {
                let accounts = self.tabs.read().addresses(local);
                let _ = reply.send(accounts);
            }
            Job::GetBaseFee { reply } => {
                let _ = reply.send(self.tabs.read().base_fee());
            }
            Job::SetBaseFee { new_base_fee } => {
                self.tabs.write().set_base_fee(new_base_fee);
            }
            Job::GetGasPrice { reply } => {
                let _ = reply.send(self.options.minimal_gas_price);
            }
            Job::SetGasPrice { value, reply } => {
                self.options.minimal_gas_price = value;
                let dropped = self.tabs.write().drop_below_gas_price(tip_from_u256(value));
                let _ = reply.send(dropped);
            }
            Job::GetItem { hash, reply } => {
                let item = self.tabs.read().get(&hash).cloned();
                let _ = reply.send(item);
            }
            Job::LocusCount { reply } => {
                let counts = self.tabs.read().count();
                let _ = reply.send((counts.local, counts.remote));
            }
            Job::MoveRemoteToLocals { address, reply } => {
                let moved = self.tabs.write().move_remote_to_locals(address);
                let _ = reply.send(moved);
            }
            Job::StatsReport { reply } => {
                let counts = self.tabs.read().count();
                let _ = reply.send((counts.pending, counts.queued));
            }
            Job::Reject { hash, reason } => {
                self.tabs.write().reject(&hash, reason);
            }
            Job::Abort => return true,
        }
        false
    }
}

/// Admission policy checked ahead of `TxTabs::insert`, the same way the
/// teacher's verifier rejects on price/limit before a transaction ever
/// reaches the pool proper. Locals are exempt from every check here, same
/// exemption `TxTabs` itself applies to age-based eviction and price drops.
fn policy_check<T: PoolTransaction>(
    tabs: &TxTabs<T>,
    options: &Options,
    tx: &T,
    local: bool,
) -> Option<RejectReason> {
    if local {
        return None;
    }
    if tx.max_priority_fee_per_gas() < options.minimal_gas_price {
        return Some(RejectReason::Underpriced);
    }
    if tabs.count().total >= options.max_count {
        return Some(RejectReason::TxPoolOverflow);
    }
    if let Some(sender) = tx.recover_sender() {
        let per_sender = tabs.by_sender().get(&sender).map_or(0, |sched| sched.count_any());
        if per_sender >= options.max_per_sender {
            return Some(RejectReason::TxPoolOverflow);
        }
    }
    None
}

fn tip_from_u256(v: ethereum_types::U256) -> txpool_core::Tip {
    if v > ethereum_types::U256::from(i128::MAX as u128) {
        txpool_core::Tip::MAX
    } else {
        v.low_u128() as txpool_core::Tip
    }
}
