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

//! Sorted multimaps on price: `ByTipIndex` keyed by `effective_gas_tip`
//! (rebuilt whenever the base fee changes) and `ByTipCapIndex` keyed by the
//! unadjusted `gas_tip_cap` (never affected by base fee). Both are a
//! balanced ordered map of `Tip -> NonceList`; kept as two separate structs
//! rather than one generic type since they differ in what key they're
//! rebuilt against and callers should never confuse the two.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use ethereum_types::H256;

use crate::{item::ItemRef, nonce_list::NonceList, sentinel::Tip, transaction::PoolTransaction};

/// Sorted multimap keyed by `effective_gas_tip`. Rebuilt in full by
/// `TxTabs::set_base_fee`; see that method for the rebase protocol.
#[derive(Debug)]
pub struct ByTipIndex<T: PoolTransaction>(BTreeMap<Tip, NonceList<T>>);

impl<T: PoolTransaction> ByTipIndex<T> {
    pub fn new() -> Self {
        ByTipIndex(BTreeMap::new())
    }

    pub fn insert(&mut self, tip: Tip, item: Arc<ItemRef<T>>) {
        self.0.entry(tip).or_insert_with(NonceList::new).insert(item);
    }

    pub fn remove(&mut self, tip: Tip, nonce: u64, id: &H256) -> Option<Arc<ItemRef<T>>> {
        let bucket = self.0.get_mut(&tip)?;
        let removed = bucket.remove(nonce, id);
        if removed.is_some() && bucket.is_empty() {
            self.0.remove(&tip);
        }
        removed
    }

    pub fn contains(&self, tip: Tip, nonce: u64, id: &H256) -> bool {
        self.0.get(&tip).map_or(false, |bucket| bucket.contains(nonce, id))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter_asc(&self) -> impl Iterator<Item = (Tip, &Arc<ItemRef<T>>)> {
        self.0.iter().flat_map(|(tip, bucket)| bucket.iter_asc().map(move |item| (*tip, item)))
    }

    pub fn iter_desc(&self) -> impl Iterator<Item = (Tip, &Arc<ItemRef<T>>)> {
        self.0.iter().rev().flat_map(|(tip, bucket)| bucket.iter_desc().map(move |item| (*tip, item)))
    }

    pub fn ge(&self, tip: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Included(tip), Bound::Unbounded))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn gt(&self, tip: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Excluded(tip), Bound::Unbounded))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn le(&self, tip: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Unbounded, Bound::Included(tip)))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn lt(&self, tip: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Unbounded, Bound::Excluded(tip)))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn eq(&self, tip: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0.get(&tip).into_iter().flat_map(|bucket| bucket.iter_asc())
    }

    /// Empties the index, handing back every `(tip, item)` pair in no
    /// particular order, for `TxTabs::set_base_fee` to reinsert under new
    /// keys.
    pub fn drain(&mut self) -> Vec<(Tip, Arc<ItemRef<T>>)> {
        let mut out = Vec::with_capacity(self.len());
        for (tip, bucket) in self.0.iter() {
            for item in bucket.iter_asc() {
                out.push((*tip, item.clone()));
            }
        }
        self.0.clear();
        out
    }
}

impl<T: PoolTransaction> Default for ByTipIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted multimap keyed by the unadjusted `gas_tip_cap`. Same shape as
/// `ByTipIndex` but never rebuilt on a base-fee change.
#[derive(Debug)]
pub struct ByTipCapIndex<T: PoolTransaction>(BTreeMap<Tip, NonceList<T>>);

impl<T: PoolTransaction> ByTipCapIndex<T> {
    pub fn new() -> Self {
        ByTipCapIndex(BTreeMap::new())
    }

    pub fn insert(&mut self, tip_cap: Tip, item: Arc<ItemRef<T>>) {
        self.0.entry(tip_cap).or_insert_with(NonceList::new).insert(item);
    }

    pub fn remove(&mut self, tip_cap: Tip, nonce: u64, id: &H256) -> Option<Arc<ItemRef<T>>> {
        let bucket = self.0.get_mut(&tip_cap)?;
        let removed = bucket.remove(nonce, id);
        if removed.is_some() && bucket.is_empty() {
            self.0.remove(&tip_cap);
        }
        removed
    }

    pub fn contains(&self, tip_cap: Tip, nonce: u64, id: &H256) -> bool {
        self.0.get(&tip_cap).map_or(false, |bucket| bucket.contains(nonce, id))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter_asc(&self) -> impl Iterator<Item = (Tip, &Arc<ItemRef<T>>)> {
        self.0.iter().flat_map(|(tip, bucket)| bucket.iter_asc().map(move |item| (*tip, item)))
    }

    pub fn iter_desc(&self) -> impl Iterator<Item = (Tip, &Arc<ItemRef<T>>)> {
        self.0.iter().rev().flat_map(|(tip, bucket)| bucket.iter_desc().map(move |item| (*tip, item)))
    }

    pub fn ge(&self, tip_cap: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Included(tip_cap), Bound::Unbounded))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn gt(&self, tip_cap: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Excluded(tip_cap), Bound::Unbounded))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn le(&self, tip_cap: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Unbounded, Bound::Included(tip_cap)))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn lt(&self, tip_cap: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0
            .range((Bound::Unbounded, Bound::Excluded(tip_cap)))
            .flat_map(|(_, bucket)| bucket.iter_asc())
    }

    pub fn eq(&self, tip_cap: Tip) -> impl Iterator<Item = &Arc<ItemRef<T>>> {
        self.0.get(&tip_cap).into_iter().flat_map(|bucket| bucket.iter_asc())
    }
}

impl<T: PoolTransaction> Default for ByTipCapIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{item::Status, test_utils::tx};

    fn item(seed: u64, nonce: u64) -> Arc<ItemRef<crate::test_utils::TestTransaction>> {
        Arc::new(ItemRef::new(tx(seed, nonce), false, Status::Pending, String::new(), 0, seed).unwrap())
    }

    #[test]
    fn ascending_and_descending_are_exact_reverses() {
        let mut idx = ByTipIndex::new();
        let a = item(1, 0);
        let b = item(2, 0);
        let c = item(3, 0);
        idx.insert(10, a.clone());
        idx.insert(30, b.clone());
        idx.insert(20, c.clone());

        let asc: Vec<_> = idx.iter_asc().map(|(tip, _)| tip).collect();
        assert_eq!(asc, vec![10, 20, 30]);

        let mut desc: Vec<_> = idx.iter_desc().map(|(tip, _)| tip).collect();
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn range_queries_match_semantics() {
        let mut idx = ByTipIndex::new();
        idx.insert(5, item(1, 0));
        idx.insert(10, item(2, 0));
        idx.insert(15, item(3, 0));

        assert_eq!(idx.ge(10).count(), 2);
        assert_eq!(idx.gt(10).count(), 1);
        assert_eq!(idx.le(10).count(), 2);
        assert_eq!(idx.lt(10).count(), 1);
        assert_eq!(idx.eq(10).count(), 1);
    }

    #[test]
    fn negative_tip_sorts_below_zero() {
        let mut idx = ByTipIndex::new();
        idx.insert(-5, item(1, 0));
        idx.insert(5, item(2, 0));

        let asc: Vec<_> = idx.iter_asc().map(|(tip, _)| tip).collect();
        assert_eq!(asc, vec![-5, 5]);
    }
}
