// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of Parity.

// Parity is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Parity is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Parity.  If not, see <http://www.gnu.org/licenses/>.

//! `TxTabs`: the facade that is the only place allowed to mutate the five
//! indices, so the cross-index invariants documented in the crate root stay
//! coupled. No index is ever touched directly from outside this module.
//!
//! `TxTabs` takes every timestamp it needs (`insert`, `evict_inactive`) as an
//! explicit parameter rather than reading a clock itself — it has no I/O and
//! no ambient state, which is what makes it deterministic to test and safe
//! to call from a single-threaded worker with no suspension points (see
//! crate docs on the concurrency model).

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use ethereum_types::{Address, H256, U256};
use log::{debug, trace};

use crate::{
    by_id::ByIdIndex,
    by_sender::BySenderIndex,
    by_tip::{ByTipCapIndex, ByTipIndex},
    error::{InsertError, VerifyFailure},
    item::{ItemRef, Status},
    sentinel::Tip,
    transaction::PoolTransaction,
};

/// Reason an item was moved to the wastebasket. Folds in the full
/// user-visible error taxonomy: some variants (`AlreadyKnown`,
/// `InvalidSender`) never reach `reject` since `insert` already reports them
/// directly, but they're part of one taxonomy shared with the driver layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No reason given; the default.
    None,
    /// Generic; used when no finer code applies.
    Unspecified,
    /// Hash already existed in the pool.
    AlreadyKnown,
    /// Signature did not recover.
    InvalidSender,
    /// Below the pool's minimum gas price.
    Underpriced,
    /// Pool at capacity; remote rejected.
    TxPoolOverflow,
    /// Replacement did not exceed the required price bump.
    ReplaceUnderpriced,
    /// Exceeds per-block gas allowance.
    GasLimit,
    /// Value was negative (caller-detected; `U256` itself cannot represent
    /// this, so the check happens before construction).
    NegativeValue,
    /// Input larger than the DoS-protection limit.
    OversizedData,
}

impl From<InsertError> for RejectReason {
    fn from(err: InsertError) -> Self {
        match err {
            InsertError::AlreadyKnown => RejectReason::AlreadyKnown,
            InsertError::InvalidSender => RejectReason::InvalidSender,
        }
    }
}

/// One wastebasket entry: the removed item plus why it was removed.
#[derive(Debug)]
pub struct RejectedItem<T: PoolTransaction> {
    /// The item as it stood at removal time.
    pub item: Arc<ItemRef<T>>,
    /// Why it was rejected.
    pub reason: RejectReason,
}

/// Maintained incrementally on every mutation; never recomputed by
/// scanning (see `verify` for the scan-based cross-check used in tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub local: usize,
    pub remote: usize,
    pub queued: usize,
    pub pending: usize,
    pub staged: usize,
    pub rejected: usize,
}

/// The multi-index transaction store.
#[derive(Debug)]
pub struct TxTabs<T: PoolTransaction> {
    by_id: ByIdIndex<T>,
    by_sender: BySenderIndex<T>,
    by_tip: ByTipIndex<T>,
    by_tip_cap: ByTipCapIndex<T>,
    base_fee: Option<U256>,
    rejects: VecDeque<RejectedItem<T>>,
    max_rejects: usize,
    counts: Counts,
    next_seq: u64,
}

impl<T: PoolTransaction> TxTabs<T> {
    /// Builds an empty store. `max_rejects` is the wastebasket's FIFO
    /// capacity (invariant 6); `0` disables the wastebasket entirely.
    pub fn new(max_rejects: usize) -> Self {
        TxTabs {
            by_id: ByIdIndex::new(),
            by_sender: BySenderIndex::new(),
            by_tip: ByTipIndex::new(),
            by_tip_cap: ByTipCapIndex::new(),
            base_fee: None,
            rejects: VecDeque::new(),
            max_rejects,
            counts: Counts::default(),
            next_seq: 0,
        }
    }

    /// Current base fee, if one has been set via `set_base_fee`.
    pub fn base_fee(&self) -> Option<U256> {
        self.base_fee
    }

    fn inc_status(&mut self, status: Status) {
        match status {
            Status::Queued => self.counts.queued += 1,
            Status::Pending => self.counts.pending += 1,
            Status::Staged => self.counts.staged += 1,
        }
    }

    fn dec_status(&mut self, status: Status) {
        match status {
            Status::Queued => self.counts.queued -= 1,
            Status::Pending => self.counts.pending -= 1,
            Status::Staged => self.counts.staged -= 1,
        }
    }

    /// Computes the hash, recovers the sender, rejects duplicates, and —
    /// on success — inserts into all five indices atomically: the item is
    /// constructed fully before any index is touched, so a failure here
    /// never leaves a partial entry behind.
    pub fn insert(
        &mut self,
        tx: T,
        local: bool,
        status: Status,
        info: String,
        timestamp: u64,
    ) -> Result<H256, InsertError> {
        let hash = tx.hash();
        if self.by_id.contains(&hash) {
            trace!(target: "txqueue", "[{hash:?}] rejected: already known");
            return Err(InsertError::AlreadyKnown);
        }

        let seq = self.next_seq;
        let item = ItemRef::new(tx, local, status, info, timestamp, seq).ok_or_else(|| {
            trace!(target: "txqueue", "[{hash:?}] rejected: sender did not recover");
            InsertError::InvalidSender
        })?;
        self.next_seq += 1;

        let item = Arc::new(item);
        let tip = item.effective_gas_tip(self.base_fee);
        let tip_cap = item.gas_tip_cap();

        self.by_id.insert(item.clone());
        self.by_sender.insert(item.clone());
        self.by_tip.insert(tip, item.clone());
        self.by_tip_cap.insert(tip_cap, item);

        self.counts.total += 1;
        if local {
            self.counts.local += 1;
        } else {
            self.counts.remote += 1;
        }
        self.inc_status(status);

        debug!(target: "txqueue", "[{hash:?}] imported ({status:?}, local={local})");
        Ok(hash)
    }

    /// Runs `insert` over a batch, returning one result per input aligned
    /// by position — a partial failure in one element never affects another.
    pub fn insert_batch(
        &mut self,
        batch: Vec<(T, bool, Status, String)>,
        timestamp: u64,
    ) -> Vec<Result<H256, InsertError>> {
        batch
            .into_iter()
            .map(|(tx, local, status, info)| self.insert(tx, local, status, info, timestamp))
            .collect()
    }

    /// Removes from `ByIdIndex` first (the owning index — see the crate
    /// docs on shared ownership) and then from every derived index, so a
    /// reader can never observe a dangling reference.
    pub fn delete(&mut self, hash: &H256) -> Option<Arc<ItemRef<T>>> {
        let item = self.by_id.delete(hash)?;
        self.remove_from_derived(&item);
        trace!(target: "txqueue", "[{hash:?}] deleted");
        Some(item)
    }

    fn remove_from_derived(&mut self, item: &Arc<ItemRef<T>>) {
        let tip = item.effective_gas_tip(self.base_fee);
        let tip_cap = item.gas_tip_cap();
        self.by_sender.delete(&item.sender, item.nonce(), &item.id, item.is_local(), item.status());
        self.by_tip.remove(tip, item.nonce(), &item.id);
        self.by_tip_cap.remove(tip_cap, item.nonce(), &item.id);

        self.counts.total -= 1;
        if item.is_local() {
            self.counts.local -= 1;
        } else {
            self.counts.remote -= 1;
        }
        self.dec_status(item.status());
    }

    /// Hard-removes the item and pushes it into the bounded wastebasket
    /// FIFO, evicting the oldest entry first if the cap is exceeded.
    pub fn reject(&mut self, hash: &H256, reason: RejectReason) -> bool {
        let item = match self.delete(hash) {
            Some(item) => item,
            None => return false,
        };
        item.set_reject_reason(format!("{reason:?}"));

        if self.max_rejects > 0 {
            if self.rejects.len() >= self.max_rejects {
                self.rejects.pop_front();
            }
            self.rejects.push_back(RejectedItem { item, reason });
            self.counts.rejected = self.rejects.len();
        }
        true
    }

    /// Moves `hash` between the local/remote partitions. A no-op (but
    /// still reported as success) if it's already in the destination.
    pub fn reassign_local(&mut self, hash: &H256, new_local: bool) -> bool {
        let item = match self.by_id.get(hash) {
            Some(item) => item.clone(),
            None => return false,
        };
        let old_local = item.is_local();
        if old_local == new_local {
            return true;
        }
        self.by_id.reassign_locality(hash, new_local);
        self.by_sender.reassign_locality(&item.sender, item.nonce(), hash, old_local, new_local);

        if old_local {
            self.counts.local -= 1;
            self.counts.remote += 1;
        } else {
            self.counts.remote -= 1;
            self.counts.local += 1;
        }
        true
    }

    /// Moves `hash` between lifecycle states. The store imposes no
    /// ordering on transitions; classification is entirely external.
    pub fn reassign_status(&mut self, hash: &H256, new_status: Status) -> bool {
        let item = match self.by_id.get(hash) {
            Some(item) => item.clone(),
            None => return false,
        };
        let old_status = item.status();
        if old_status == new_status {
            return true;
        }
        item.set_status(new_status);
        self.by_sender
            .reassign_status(&item.sender, item.nonce(), hash, item.clone(), old_status, new_status);

        self.dec_status(old_status);
        self.inc_status(new_status);
        true
    }

    /// Rebuilds `ByTipIndex` against a new base fee. Drains the old index
    /// into a scratch `Vec` first and only swaps it in once every item has
    /// been recomputed, so a panic mid-rebuild (e.g. from a future change
    /// that adds fallible work here) would leave the old index in place
    /// rather than a half-rebuilt one.
    pub fn set_base_fee(&mut self, new_base_fee: Option<U256>) {
        let drained = self.by_tip.drain();
        let mut rebuilt = ByTipIndex::new();
        for (_, item) in drained {
            let new_tip = item.effective_gas_tip(new_base_fee);
            rebuilt.insert(new_tip, item);
        }
        self.by_tip = rebuilt;
        self.base_fee = new_base_fee;
        debug!(target: "txqueue", "base fee set to {new_base_fee:?}");
    }

    /// Empties the wastebasket, returning `(count_before, capacity)`.
    pub fn flush_rejects(&mut self) -> (usize, usize) {
        let before = self.rejects.len();
        self.rejects.clear();
        self.counts.rejected = 0;
        (before, self.max_rejects)
    }

    /// Deletes every remote item older than `lifetime_ms` (relative to
    /// `now`) and pushes it into the wastebasket. Locals are exempt.
    pub fn evict_inactive(&mut self, now: u64, lifetime_ms: u64) -> usize {
        let stale: Vec<H256> = self
            .by_id
            .iter_arrival(false)
            .filter(|item| now.saturating_sub(item.timestamp) > lifetime_ms)
            .map(|item| item.id)
            .collect();

        for hash in &stale {
            self.reject(hash, RejectReason::Unspecified);
        }
        if !stale.is_empty() {
            debug!(target: "txqueue", "evicted {} inactive transactions", stale.len());
        }
        stale.len()
    }

    /// Moves every remote item belonging to `sender` to local, returning
    /// how many were moved.
    pub fn move_remote_to_locals(&mut self, sender: Address) -> usize {
        let hashes: Vec<H256> = match self.by_sender.get(&sender) {
            Some(sched) => sched.by_local(false).iter_asc().map(|item| item.id).collect(),
            None => return 0,
        };
        let mut moved = 0;
        for hash in hashes {
            if self.reassign_local(&hash, true) {
                moved += 1;
            }
        }
        moved
    }

    /// Deletes every remote item with a tip cap strictly below
    /// `min_gas_price`, returning how many were dropped. Locals are exempt
    /// from price floors.
    pub fn drop_below_gas_price(&mut self, min_gas_price: Tip) -> usize {
        let hashes: Vec<H256> = self
            .by_tip_cap
            .lt(min_gas_price)
            .filter(|item| !item.is_local())
            .map(|item| item.id)
            .collect();
        let mut dropped = 0;
        for hash in hashes {
            if self.reject(&hash, RejectReason::Underpriced) {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn get(&self, hash: &H256) -> Option<&Arc<ItemRef<T>>> {
        self.by_id.get(hash)
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.by_id.contains(hash)
    }

    /// Addresses with at least one item in the given locality.
    pub fn addresses(&self, local: bool) -> BTreeSet<Address> {
        self.by_sender.addresses(local)
    }

    pub fn count(&self) -> Counts {
        self.counts
    }

    pub fn by_id(&self) -> &ByIdIndex<T> {
        &self.by_id
    }

    pub fn by_sender(&self) -> &BySenderIndex<T> {
        &self.by_sender
    }

    pub fn by_tip(&self) -> &ByTipIndex<T> {
        &self.by_tip
    }

    pub fn by_tip_cap(&self) -> &ByTipCapIndex<T> {
        &self.by_tip_cap
    }

    /// Debug/test-only consistency check over §8's quantified invariants.
    /// A non-empty result in production code is a programming bug, never a
    /// recoverable condition.
    pub fn verify(&self) -> Result<(), Vec<VerifyFailure>> {
        crate::verify::verify(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    #[test]
    fn s1_duplicate_insert_rejected() {
        let _ = env_logger::try_init();
        let mut tabs = TxTabs::new(16);
        let h = tabs.insert(tx(1, 0), false, Status::Pending, String::new(), 0).unwrap();
        let err = tabs.insert(tx(1, 0).with_hash(h), false, Status::Pending, String::new(), 0);
        assert_eq!(err, Err(InsertError::AlreadyKnown));
        assert_eq!(tabs.count().total, 1);
    }

    #[test]
    fn s2_tip_ordering() {
        let mut tabs = TxTabs::new(16);
        tabs.insert(tx(1, 0).gas_price(10), false, Status::Pending, String::new(), 0).unwrap();
        tabs.insert(tx(2, 0).gas_price(30), false, Status::Pending, String::new(), 0).unwrap();
        tabs.insert(tx(3, 0).gas_price(20), false, Status::Pending, String::new(), 0).unwrap();

        let asc: Vec<_> = tabs.by_tip().iter_asc().map(|(tip, _)| tip).collect();
        assert_eq!(asc, vec![10, 20, 30]);
        let mut desc: Vec<_> = tabs.by_tip().iter_desc().map(|(tip, _)| tip).collect();
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn s3_base_fee_rebase() {
        let mut tabs = TxTabs::new(16);
        tabs.set_base_fee(Some(U256::from(5)));
        let h = tabs
            .insert(tx(1, 0).eip1559(20, 15), false, Status::Pending, String::new(), 0)
            .unwrap();
        assert!(tabs.by_tip().contains(15, 0, &h));

        tabs.set_base_fee(Some(U256::from(12)));
        assert!(tabs.by_tip().contains(8, 0, &h));
        assert!(!tabs.by_tip().contains(15, 0, &h));
    }

    #[test]
    fn s3_rebase_round_trip_is_idempotent() {
        let mut tabs = TxTabs::new(16);
        let h = tabs
            .insert(tx(1, 0).eip1559(20, 15), false, Status::Pending, String::new(), 0)
            .unwrap();
        tabs.set_base_fee(Some(U256::from(5)));
        let tip_before = tabs.get(&h).unwrap().effective_gas_tip(tabs.base_fee());

        tabs.set_base_fee(Some(U256::from(9)));
        tabs.set_base_fee(Some(U256::from(5)));
        let tip_after = tabs.get(&h).unwrap().effective_gas_tip(tabs.base_fee());
        assert_eq!(tip_before, tip_after);
        assert!(tabs.by_tip().contains(tip_after, 0, &h));
    }

    #[test]
    fn s4_locality_swap() {
        let mut tabs = TxTabs::new(16);
        let l1 = tabs.insert(tx(1, 0), true, Status::Pending, String::new(), 0).unwrap();
        let l2 = tabs.insert(tx(2, 0), true, Status::Pending, String::new(), 0).unwrap();
        let r1 = tabs.insert(tx(3, 0), false, Status::Pending, String::new(), 0).unwrap();
        let r2 = tabs.insert(tx(4, 0), false, Status::Pending, String::new(), 0).unwrap();

        tabs.reassign_local(&l1, false);
        tabs.reassign_local(&l2, false);
        tabs.reassign_local(&r1, true);
        tabs.reassign_local(&r2, true);

        assert_eq!(tabs.count().local, 2);
        assert_eq!(tabs.count().remote, 2);
        let locals: Vec<_> = tabs.by_id().iter_arrival(true).map(|i| i.id).collect();
        assert_eq!(locals, vec![r1, r2]);
        let remotes: Vec<_> = tabs.by_id().iter_arrival(false).map(|i| i.id).collect();
        assert_eq!(remotes, vec![l1, l2]);
    }

    #[test]
    fn s5_age_based_eviction() {
        let mut tabs = TxTabs::new(200);
        for i in 0..100u64 {
            tabs.insert(tx(i, 0), false, Status::Pending, String::new(), 0).unwrap();
        }
        tabs.insert(tx(1000, 0), false, Status::Pending, String::new(), 1_000).unwrap();

        let evicted = tabs.evict_inactive(1_000, 500);
        assert_eq!(evicted, 100);
        assert_eq!(tabs.count().total, 1);
        assert_eq!(tabs.count().rejected, 100);
    }

    #[test]
    fn s5_wastebasket_truncates_to_capacity() {
        let mut tabs = TxTabs::new(10);
        for i in 0..100u64 {
            tabs.insert(tx(i, 0), false, Status::Pending, String::new(), 0).unwrap();
        }
        tabs.evict_inactive(1_000, 500);
        assert_eq!(tabs.count().rejected, 10);
    }

    #[test]
    fn s6_move_remote_to_locals() {
        let mut tabs = TxTabs::new(16);
        let sender = crate::test_utils::address(1);
        for n in 0..5u64 {
            tabs.insert(tx(1, n), false, Status::Pending, String::new(), 0).unwrap();
        }
        for n in 5..7u64 {
            tabs.insert(tx(1, n), true, Status::Pending, String::new(), 0).unwrap();
        }

        let moved = tabs.move_remote_to_locals(sender);
        assert_eq!(moved, 5);
        let sched = tabs.by_sender().get(&sender).unwrap();
        assert_eq!(sched.count_local(true), 7);
        assert_eq!(sched.count_local(false), 0);
        assert_eq!(tabs.count().total, 7);
    }

    #[test]
    fn round_trip_insert_delete() {
        let mut tabs = TxTabs::new(16);
        let before = tabs.count();
        let h = tabs.insert(tx(1, 0), false, Status::Pending, String::new(), 0).unwrap();
        let removed = tabs.delete(&h);
        assert!(removed.is_some());
        assert_eq!(tabs.count(), before);
        assert!(tabs.verify().is_ok());
    }

    #[test]
    fn double_locality_flip_restores_state() {
        let mut tabs = TxTabs::new(16);
        let h = tabs.insert(tx(1, 0), false, Status::Pending, String::new(), 0).unwrap();
        tabs.reassign_local(&h, true);
        tabs.reassign_local(&h, false);
        assert!(!tabs.get(&h).unwrap().is_local());
        assert_eq!(tabs.count().local, 0);
        assert_eq!(tabs.count().remote, 1);
        assert!(tabs.verify().is_ok());
    }

    #[test]
    fn invariants_hold_over_a_mixed_sequence() {
        let mut tabs = TxTabs::new(32);
        let mut hashes = Vec::new();
        for i in 0..20u64 {
            hashes.push(tabs.insert(tx(i % 4, i), i % 2 == 0, Status::Queued, String::new(), i).unwrap());
        }
        for (i, h) in hashes.iter().enumerate() {
            if i % 3 == 0 {
                tabs.reassign_status(h, Status::Pending);
            }
            if i % 5 == 0 {
                tabs.reassign_local(h, i % 2 != 0);
            }
        }
        tabs.set_base_fee(Some(U256::from(3)));
        tabs.delete(&hashes[0]);
        assert!(tabs.verify().is_ok());
    }
}
