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

//! `ByIdIndex`: the primary hash -> item table, partitioned into a `local`
//! and a `remote` insertion-ordered map. Iterating a partition yields
//! arrival order, which is what age-based eviction walks.

use std::sync::Arc;

use ethereum_types::H256;
use linked_hash_map::LinkedHashMap;

use crate::{item::ItemRef, transaction::PoolTransaction};

/// Primary hash table, split by locality so arrival order is tracked
/// separately per partition.
#[derive(Debug)]
pub struct ByIdIndex<T: PoolTransaction> {
    local: LinkedHashMap<H256, Arc<ItemRef<T>>>,
    remote: LinkedHashMap<H256, Arc<ItemRef<T>>>,
}

impl<T: PoolTransaction> ByIdIndex<T> {
    pub fn new() -> Self {
        ByIdIndex {
            local: LinkedHashMap::new(),
            remote: LinkedHashMap::new(),
        }
    }

    fn partition(&self, local: bool) -> &LinkedHashMap<H256, Arc<ItemRef<T>>> {
        if local {
            &self.local
        } else {
            &self.remote
        }
    }

    fn partition_mut(&mut self, local: bool) -> &mut LinkedHashMap<H256, Arc<ItemRef<T>>> {
        if local {
            &mut self.local
        } else {
            &mut self.remote
        }
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.local.contains_key(hash) || self.remote.contains_key(hash)
    }

    pub fn get(&self, hash: &H256) -> Option<&Arc<ItemRef<T>>> {
        self.local.get(hash).or_else(|| self.remote.get(hash))
    }

    /// Appends to the item's own locality partition. Fails (returns `false`)
    /// if the hash is already present in either partition.
    pub fn insert(&mut self, item: Arc<ItemRef<T>>) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        let local = item.is_local();
        self.partition_mut(local).insert(item.id, item);
        true
    }

    pub fn delete(&mut self, hash: &H256) -> Option<Arc<ItemRef<T>>> {
        self.local.remove(hash).or_else(|| self.remote.remove(hash))
    }

    pub fn first(&self, local: bool) -> Option<&Arc<ItemRef<T>>> {
        self.partition(local).front().map(|(_, v)| v)
    }

    pub fn last(&self, local: bool) -> Option<&Arc<ItemRef<T>>> {
        self.partition(local).back().map(|(_, v)| v)
    }

    /// Arrival-order iteration over one partition — the FIFO used by
    /// age-based eviction.
    pub fn iter_arrival(&self, local: bool) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.partition(local).values()
    }

    pub fn len(&self, local: bool) -> usize {
        self.partition(local).len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    /// Moves the item to `new_local`'s partition, wherever it currently
    /// lives. It becomes the newest entry of the destination partition,
    /// since `LinkedHashMap::insert` always appends at the back.
    pub fn reassign_locality(&mut self, hash: &H256, new_local: bool) -> bool {
        let item = self.local.remove(hash).or_else(|| self.remote.remove(hash));
        match item {
            Some(item) => {
                item.set_local(new_local);
                self.partition_mut(new_local).insert(*hash, item);
                true
            }
            None => false,
        }
    }
}

impl<T: PoolTransaction> Default for ByIdIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{item::Status, test_utils::tx};

    fn item(seed: u64, local: bool) -> Arc<ItemRef<crate::test_utils::TestTransaction>> {
        Arc::new(ItemRef::new(tx(seed, 0), local, Status::Pending, String::new(), 0, seed).unwrap())
    }

    #[test]
    fn duplicate_insert_across_partitions_rejected() {
        let mut idx = ByIdIndex::new();
        let a = item(1, false);
        assert!(idx.insert(a.clone()));

        let dup = Arc::new(
            ItemRef::new(tx(1, 0).with_hash(a.id), true, Status::Pending, String::new(), 0, 99).unwrap(),
        );
        assert!(!idx.insert(dup));
    }

    #[test]
    fn arrival_order_preserved_per_partition() {
        let mut idx = ByIdIndex::new();
        let a = item(1, false);
        let b = item(2, false);
        idx.insert(a.clone());
        idx.insert(b.clone());

        let order: Vec<_> = idx.iter_arrival(false).map(|i| i.id).collect();
        assert_eq!(order, vec![a.id, b.id]);
        assert_eq!(idx.first(false).unwrap().id, a.id);
        assert_eq!(idx.last(false).unwrap().id, b.id);
    }

    #[test]
    fn reassign_locality_moves_and_becomes_newest() {
        let mut idx = ByIdIndex::new();
        let a = item(1, false);
        let b = item(2, true);
        idx.insert(a.clone());
        idx.insert(b.clone());

        assert!(idx.reassign_locality(&a.id, true));
        assert!(a.is_local());
        assert_eq!(idx.len(false), 0);
        assert_eq!(idx.len(true), 2);
        assert_eq!(idx.last(true).unwrap().id, a.id);
    }

    #[test]
    fn round_trip_insert_delete_restores_state() {
        let mut idx = ByIdIndex::new();
        let a = item(1, false);
        idx.insert(a.clone());
        let removed = idx.delete(&a.id);
        assert_eq!(removed.map(|i| i.id), Some(a.id));
        assert!(idx.is_empty());
    }
}
