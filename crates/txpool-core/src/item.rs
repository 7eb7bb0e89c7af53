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

//! `ItemRef`: the unit of storage shared, by reference, across all five
//! indices.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use ethereum_types::{Address, H256, U256};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{sentinel::Tip, transaction::PoolTransaction};

/// Lifecycle state of a pooled transaction.
///
/// Transitions are driven entirely by `TxTabs::reassign`; the store itself
/// imposes no ordering between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Not yet eligible for inclusion (e.g. nonce gap ahead of it).
    Queued,
    /// Eligible for inclusion in the next block.
    Pending,
    /// Selected into a block currently being assembled.
    Staged,
}

impl Status {
    /// All three states, in a fixed, stable order. Used by `verify` to seed
    /// its per-status scan without repeating the list.
    pub const ALL: [Status; 3] = [Status::Queued, Status::Pending, Status::Staged];

    fn from_u8(v: u8) -> Status {
        match v {
            0 => Status::Queued,
            1 => Status::Pending,
            _ => Status::Staged,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Pending => 1,
            Status::Staged => 2,
        }
    }
}

/// Converts a `U256` gas value into the signed `Tip` domain used by the
/// price indices, saturating instead of panicking on overflow. Real gas
/// prices never come close to `i128::MAX`; this only guards against
/// adversarial input.
fn u256_to_tip(v: U256) -> Tip {
    if v > U256::from(i128::MAX as u128) {
        Tip::MAX
    } else {
        v.low_u128() as Tip
    }
}

/// One transaction plus the metadata the pool needs to place it in every
/// index.
///
/// All fields besides `local`, `status` and `reject_reason` are immutable
/// once constructed; those three only ever change via `TxTabs::reassign`
/// and `TxTabs::reject`. They live behind atomics/a small mutex rather than
/// plain fields because every index holds its own `Arc<ItemRef<T>>` clone
/// of the same record (see crate docs: "ItemRef is shared by reference
/// across indices") — there is no single owner `&mut` access could go
/// through.
#[derive(Debug)]
pub struct ItemRef<T> {
    /// Transaction hash; the primary key across the whole pool.
    pub id: H256,
    /// The transaction payload itself.
    pub tx: T,
    /// Sender, recovered once at construction time.
    pub sender: Address,
    local: AtomicBool,
    status: AtomicU8,
    /// Monotonic arrival time (milliseconds), used for FIFO age-based
    /// eviction and as the insertion order tiebreaker within a (sender,
    /// nonce) or (tip, nonce) bucket.
    pub timestamp: u64,
    /// Opaque diagnostic string supplied by the caller at insertion time.
    pub info: String,
    reject_reason: Mutex<Option<String>>,
    /// Insertion sequence number, unique and monotonically increasing
    /// across the whole pool; the true tiebreaker for "arrival order"
    /// once two items share a timestamp tick.
    pub seq: u64,
}

impl<T: PoolTransaction> ItemRef<T> {
    /// Construct a new item, recovering the sender from `tx`.
    ///
    /// Fails with `None` if signature recovery does not yield an address;
    /// callers surface this as `InsertError::InvalidSender`.
    pub fn new(
        tx: T,
        local: bool,
        status: Status,
        info: String,
        timestamp: u64,
        seq: u64,
    ) -> Option<Self> {
        let sender = tx.recover_sender()?;
        let id = tx.hash();
        Some(ItemRef {
            id,
            sender,
            local: AtomicBool::new(local),
            status: AtomicU8::new(status.as_u8()),
            timestamp,
            info,
            reject_reason: Mutex::new(None),
            seq,
            tx,
        })
    }

    /// Current locality; `true` means the item is exempt from price floors
    /// and age-based eviction.
    pub fn is_local(&self) -> bool {
        self.local.load(Ordering::Acquire)
    }

    pub(crate) fn set_local(&self, local: bool) {
        self.local.store(local, Ordering::Release);
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, status: Status) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    /// Reason the item was moved to the wastebasket, if any.
    pub fn reject_reason(&self) -> Option<String> {
        self.reject_reason.lock().clone()
    }

    pub(crate) fn set_reject_reason(&self, reason: String) {
        *self.reject_reason.lock() = Some(reason);
    }

    /// `nonce` lifted to `u64` for index keys.
    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    /// `effective_gas_tip = min(max_priority_fee, max_fee - base_fee)` for
    /// EIP-1559 transactions, `gas_price - base_fee` for legacy ones.
    /// `base_fee = None` disables the subtraction (the `TxNoBaseFee`
    /// sentinel case), so the result is just the transaction's own price.
    pub fn effective_gas_tip(&self, base_fee: Option<U256>) -> Tip {
        let base_fee = base_fee.map(u256_to_tip).unwrap_or(0);
        if self.tx.is_eip1559() {
            let max_fee = u256_to_tip(self.tx.gas_price_or_max_fee());
            let priority_fee = u256_to_tip(self.tx.max_priority_fee_per_gas());
            std::cmp::min(priority_fee, max_fee.saturating_sub(base_fee))
        } else {
            let gas_price = u256_to_tip(self.tx.gas_price_or_max_fee());
            gas_price.saturating_sub(base_fee)
        }
    }

    /// `gas_tip_cap`: `max_priority_fee_per_gas` for EIP-1559, `gas_price`
    /// for legacy. Unlike `effective_gas_tip`, never affected by base fee.
    pub fn gas_tip_cap(&self) -> Tip {
        u256_to_tip(self.tx.max_priority_fee_per_gas())
    }
}
