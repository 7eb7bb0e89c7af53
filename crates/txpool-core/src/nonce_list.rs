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

//! `NonceList`: an ordered `nonce -> ItemList` map, the building block
//! shared by `BySenderIndex`, `ByTipIndex` and `ByTipCapIndex`. A plain
//! `BTreeMap` gives ascending order for free; descending iteration reverses
//! both the key order and the insertion order within each bucket so that
//! ascending/descending traversals are exact reverses of each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use ethereum_types::H256;
use smallvec::SmallVec;

use crate::{item::ItemRef, transaction::PoolTransaction};

/// Items sharing one `(sender, nonce)` (or, inside `ByTipIndex`, one tip),
/// kept in arrival order. The overwhelming majority of buckets hold exactly
/// one item, hence `SmallVec<[_; 1]>` rather than a heap-allocated `Vec`.
#[derive(Debug)]
pub struct ItemList<T: PoolTransaction>(SmallVec<[Arc<ItemRef<T>>; 1]>);

impl<T: PoolTransaction> ItemList<T> {
    fn new() -> Self {
        ItemList(SmallVec::new())
    }

    fn push(&mut self, item: Arc<ItemRef<T>>) {
        self.0.push(item);
    }

    fn remove(&mut self, id: &H256) -> Option<Arc<ItemRef<T>>> {
        let pos = self.0.iter().position(|item| &item.id == id)?;
        Some(self.0.remove(pos))
    }

    /// Arrival-order iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0.iter()
    }

    /// Reverse-arrival-order iteration.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, id: &H256) -> bool {
        self.0.iter().any(|item| &item.id == id)
    }
}

/// Ordered `nonce -> ItemList` map. Used sender-scoped inside `SchedList`
/// and sender-independent inside `ByTipIndex`/`ByTipCapIndex`, where the
/// outer key is a tip instead of a nonce but the tie-breaking rule (nonce
/// ascending, then insertion order) is the same.
#[derive(Debug)]
pub struct NonceList<T: PoolTransaction> {
    inner: BTreeMap<u64, ItemList<T>>,
    len: usize,
}

impl<T: PoolTransaction> NonceList<T> {
    pub fn new() -> Self {
        NonceList {
            inner: BTreeMap::new(),
            len: 0,
        }
    }

    /// Inserts keyed by `item.nonce()`, appended after any existing items at
    /// that nonce.
    pub fn insert(&mut self, item: Arc<ItemRef<T>>) {
        self.inner.entry(item.nonce()).or_insert_with(ItemList::new).push(item);
        self.len += 1;
    }

    /// Removes the item with hash `id` at `nonce`, dropping the bucket once
    /// it is empty.
    pub fn remove(&mut self, nonce: u64, id: &H256) -> Option<Arc<ItemRef<T>>> {
        let bucket = self.inner.get_mut(&nonce)?;
        let removed = bucket.remove(id);
        if removed.is_some() {
            self.len -= 1;
            if bucket.is_empty() {
                self.inner.remove(&nonce);
            }
        }
        removed
    }

    pub fn contains(&self, nonce: u64, id: &H256) -> bool {
        self.inner.get(&nonce).map_or(false, |bucket| bucket.contains(id))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Items sharing `nonce`, in arrival order.
    pub fn at(&self, nonce: u64) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.inner.get(&nonce).into_iter().flat_map(|bucket| bucket.iter())
    }

    /// Every item, nonce ascending, arrival order within a nonce.
    pub fn iter_asc(&self) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.inner.values().flat_map(|bucket| bucket.iter())
    }

    /// Every item, nonce descending, reverse-arrival order within a nonce —
    /// the exact reverse of `iter_asc`.
    pub fn iter_desc(&self) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.inner.values().rev().flat_map(|bucket| bucket.iter_rev())
    }
}

impl<T: PoolTransaction> Default for NonceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    fn item(sender_seed: u64, nonce: u64) -> Arc<ItemRef<crate::test_utils::TestTransaction>> {
        Arc::new(
            ItemRef::new(
                tx(sender_seed, nonce),
                false,
                crate::item::Status::Pending,
                String::new(),
                0,
                sender_seed * 100 + nonce,
            )
            .unwrap(),
        )
    }

    #[test]
    fn ascending_then_descending_are_exact_reverses() {
        let mut list = NonceList::new();
        list.insert(item(1, 3));
        list.insert(item(1, 1));
        list.insert(item(1, 2));

        let asc: Vec<_> = list.iter_asc().map(|i| i.nonce()).collect();
        let mut desc: Vec<_> = list.iter_desc().map(|i| i.nonce()).collect();
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc, vec![1, 2, 3]);
    }

    #[test]
    fn same_nonce_items_preserve_arrival_order() {
        let mut list = NonceList::new();
        let a = item(1, 5);
        let b = item(2, 5);
        list.insert(a.clone());
        list.insert(b.clone());

        let at_five: Vec<_> = list.at(5).map(|i| i.id).collect();
        assert_eq!(at_five, vec![a.id, b.id]);
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let mut list = NonceList::new();
        let a = item(1, 7);
        list.insert(a.clone());
        assert_eq!(list.len(), 1);
        assert!(list.remove(7, &a.id).is_some());
        assert!(list.is_empty());
        assert!(list.remove(7, &a.id).is_none());
    }
}
