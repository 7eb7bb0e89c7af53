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

//! Generic, multi-index Ethereum transaction pool storage.
//!
//! `TxTabs` is a single logical set of transactions addressable by six
//! independent keys at once: hash, arrival order within a local/remote
//! partition, sender, per-sender nonce, effective gas tip and gas-tip cap.
//! All five derived indices are kept in lock-step by routing every mutation
//! through the `TxTabs` facade; nothing outside this crate is allowed to
//! touch an index directly.
//!
//! Performance assumptions, same as the generic pool this crate descends
//! from:
//! - fast insert/delete: `O(log senders + log per-sender)`
//! - fast per-sender counts and ordered traversal without rescanning
//! - rebuilding the tip index on a base-fee change is the one operation
//!   allowed to be `O(n)`, since it only happens once per block

#![warn(missing_docs)]

mod by_id;
mod by_sender;
mod by_tip;
mod error;
mod item;
mod nonce_list;
mod sentinel;
mod transaction;
mod txtabs;
mod verify;

pub mod test_utils;

pub use crate::{
    by_id::ByIdIndex,
    by_sender::{BySenderIndex, SchedList},
    by_tip::{ByTipCapIndex, ByTipIndex},
    error::{InsertError, VerifyFailure},
    item::{ItemRef, Status},
    nonce_list::{ItemList, NonceList},
    sentinel::{Tip, TX_NO_BASE_FEE},
    transaction::PoolTransaction,
    txtabs::{Counts, RejectReason, RejectedItem, TxTabs},
};
