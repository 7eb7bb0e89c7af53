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

//! `BySenderIndex`: `sender -> SchedList`, where a `SchedList` exposes three
//! orthogonal sub-views (`any`, `local/remote`, `status`) over the same
//! underlying items, each as a nonce-ordered `NonceList`. Nesting keeps every
//! pivot O(log n_sender) or better without rescanning.

use std::collections::BTreeMap;
use std::sync::Arc;

use ethereum_types::{Address, H256};

use crate::{
    item::{ItemRef, Status},
    nonce_list::NonceList,
    transaction::PoolTransaction,
};

fn status_idx(status: Status) -> usize {
    match status {
        Status::Queued => 0,
        Status::Pending => 1,
        Status::Staged => 2,
    }
}

/// Per-sender view: every item (`any`), split by locality, and split by
/// status, each as its own nonce-ordered list.
#[derive(Debug)]
pub struct SchedList<T: PoolTransaction> {
    any: NonceList<T>,
    by_local: [NonceList<T>; 2],
    by_status: [NonceList<T>; 3],
}

impl<T: PoolTransaction> SchedList<T> {
    fn new() -> Self {
        SchedList {
            any: NonceList::new(),
            by_local: [NonceList::new(), NonceList::new()],
            by_status: [NonceList::new(), NonceList::new(), NonceList::new()],
        }
    }

    fn insert(&mut self, item: Arc<ItemRef<T>>) {
        self.any.insert(item.clone());
        self.by_local[item.is_local() as usize].insert(item.clone());
        self.by_status[status_idx(item.status())].insert(item);
    }

    fn remove(&mut self, nonce: u64, id: &H256, local: bool, status: Status) {
        self.any.remove(nonce, id);
        self.by_local[local as usize].remove(nonce, id);
        self.by_status[status_idx(status)].remove(nonce, id);
    }

    fn move_local(&mut self, nonce: u64, id: &H256, old_local: bool, new_local: bool) {
        if let Some(item) = self.by_local[old_local as usize].remove(nonce, id) {
            self.by_local[new_local as usize].insert(item);
        }
    }

    fn move_status(
        &mut self,
        nonce: u64,
        id: &H256,
        item: Arc<ItemRef<T>>,
        old_status: Status,
        new_status: Status,
    ) {
        self.by_status[status_idx(old_status)].remove(nonce, id);
        self.by_status[status_idx(new_status)].insert(item);
    }

    /// `true` once every sub-view is empty (checking `any` alone suffices,
    /// since `by_local`/`by_status` only ever hold a subset of it).
    pub fn is_empty(&self) -> bool {
        self.any.is_empty()
    }

    /// All of this sender's items, nonce-ordered.
    pub fn any(&self) -> &NonceList<T> {
        &self.any
    }

    /// This sender's items restricted to one locality.
    pub fn by_local(&self, local: bool) -> &NonceList<T> {
        &self.by_local[local as usize]
    }

    /// This sender's items restricted to one lifecycle status.
    pub fn by_status(&self, status: Status) -> &NonceList<T> {
        &self.by_status[status_idx(status)]
    }

    /// Total items for this sender, across every locality and status.
    pub fn count_any(&self) -> usize {
        self.any.len()
    }

    /// Items for this sender in one locality.
    pub fn count_local(&self, local: bool) -> usize {
        self.by_local[local as usize].len()
    }

    /// Items for this sender in one lifecycle status.
    pub fn count_status(&self, status: Status) -> usize {
        self.by_status[status_idx(status)].len()
    }
}

/// `sender -> SchedList`. Senders with no remaining items are dropped from
/// the map so `senders()`/`addresses()` never report a stale entry.
#[derive(Debug)]
pub struct BySenderIndex<T: PoolTransaction>(BTreeMap<Address, SchedList<T>>);

impl<T: PoolTransaction> BySenderIndex<T> {
    /// Builds an empty index.
    pub fn new() -> Self {
        BySenderIndex(BTreeMap::new())
    }

    /// Files `item` under its sender, creating that sender's `SchedList` on
    /// first insert.
    pub fn insert(&mut self, item: Arc<ItemRef<T>>) {
        self.0.entry(item.sender).or_insert_with(SchedList::new).insert(item);
    }

    /// Removes one `(sender, nonce, id)` entry, dropping the sender entirely
    /// once its `SchedList` is empty.
    pub fn delete(&mut self, sender: &Address, nonce: u64, id: &H256, local: bool, status: Status) {
        if let Some(sched) = self.0.get_mut(sender) {
            sched.remove(nonce, id, local, status);
            if sched.is_empty() {
                self.0.remove(sender);
            }
        }
    }

    /// The `SchedList` for one sender, if it currently holds any items.
    pub fn get(&self, sender: &Address) -> Option<&SchedList<T>> {
        self.0.get(sender)
    }

    /// Every sender with at least one item, in address order.
    pub fn senders(&self) -> impl Iterator<Item = &Address> {
        self.0.keys()
    }

    /// Addresses with at least one item in the given locality.
    pub fn addresses(&self, local: bool) -> std::collections::BTreeSet<Address> {
        self.0
            .iter()
            .filter(|(_, sched)| sched.count_local(local) > 0)
            .map(|(addr, _)| *addr)
            .collect()
    }

    /// Moves one item between `by_local` sub-views; `any`/`by_status` are
    /// untouched since locality doesn't affect either.
    pub fn reassign_locality(&mut self, sender: &Address, nonce: u64, id: &H256, old_local: bool, new_local: bool) {
        if let Some(sched) = self.0.get_mut(sender) {
            sched.move_local(nonce, id, old_local, new_local);
        }
    }

    /// Moves one item between `by_status` sub-views; `any`/`by_local` are
    /// untouched since status doesn't affect either.
    pub fn reassign_status(
        &mut self,
        sender: &Address,
        nonce: u64,
        id: &H256,
        item: Arc<ItemRef<T>>,
        old_status: Status,
        new_status: Status,
    ) {
        if let Some(sched) = self.0.get_mut(sender) {
            sched.move_status(nonce, id, item, old_status, new_status);
        }
    }
}

impl<T: PoolTransaction> Default for BySenderIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    fn item(seed: u64, nonce: u64, local: bool, status: Status) -> Arc<ItemRef<crate::test_utils::TestTransaction>> {
        Arc::new(ItemRef::new(tx(seed, nonce), local, status, String::new(), 0, nonce).unwrap())
    }

    #[test]
    fn counts_filtered_by_locality_and_status_independently() {
        let mut idx = BySenderIndex::new();
        let sender_seed = 1;
        let a = item(sender_seed, 0, true, Status::Queued);
        let b = item(sender_seed, 1, false, Status::Pending);
        idx.insert(a.clone());
        idx.insert(b.clone());

        let sched = idx.get(&a.sender).unwrap();
        assert_eq!(sched.count_any(), 2);
        assert_eq!(sched.count_local(true), 1);
        assert_eq!(sched.count_local(false), 1);
        assert_eq!(sched.count_status(Status::Queued), 1);
        assert_eq!(sched.count_status(Status::Pending), 1);
        assert_eq!(sched.count_status(Status::Staged), 0);
    }

    #[test]
    fn nonce_order_within_sender_is_ascending() {
        let mut idx = BySenderIndex::new();
        let sender_seed = 7;
        idx.insert(item(sender_seed, 3, false, Status::Pending));
        idx.insert(item(sender_seed, 1, false, Status::Pending));
        idx.insert(item(sender_seed, 2, false, Status::Pending));

        let nonces: Vec<_> = idx.get(&crate::test_utils::address(sender_seed)).unwrap().any().iter_asc().map(|i| i.nonce()).collect();
        assert_eq!(nonces, vec![1, 2, 3]);
    }

    #[test]
    fn empty_sender_is_dropped() {
        let mut idx = BySenderIndex::new();
        let a = item(5, 0, false, Status::Pending);
        idx.insert(a.clone());
        idx.delete(&a.sender, a.nonce(), &a.id, false, Status::Pending);
        assert!(idx.get(&a.sender).is_none());
        assert!(idx.senders().next().is_none());
    }
}
