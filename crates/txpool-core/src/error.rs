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

//! Error taxonomy. `InsertError` is what `TxTabs::insert` can return;
//! `VerifyFailure` is only produced by the debug-only `verify` entry point.

use std::fmt;

use ethereum_types::{Address, H256};

/// Failure modes of `TxTabs::insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// A live item with this hash already exists in the pool.
    AlreadyKnown,
    /// Signature recovery did not yield a sender address.
    InvalidSender,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::AlreadyKnown => write!(f, "transaction already known"),
            InsertError::InvalidSender => write!(f, "could not recover sender"),
        }
    }
}

impl std::error::Error for InsertError {}

/// One broken cross-index invariant, as detected by `TxTabs::verify`.
///
/// Only reachable from the debug-only verification entry point; a violation
/// in production is a programming bug, never a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    /// An item present in `ByIdIndex` is not reachable from `BySenderIndex`.
    BySenderMismatch(H256),
    /// An item present in `ByIdIndex` is not reachable from `ByTipIndex` at
    /// its current effective tip.
    ByTipMismatch(H256),
    /// An item present in `ByIdIndex` is not reachable from `ByTipCapIndex`
    /// at its current tip cap.
    ByTipCapMismatch(H256),
    /// Two items share `(sender, nonce)` but appear out of arrival order.
    NonceOrder {
        /// Sender whose nonce sequence is broken.
        sender: Address,
        /// Earlier-arriving nonce.
        first: u64,
        /// Later-arriving nonce, expected `>= first`.
        second: u64,
    },
    /// A maintained counter disagrees with a full scan of `ByIdIndex`.
    CountMismatch {
        /// Name of the mismatched field (`"total"`, `"local"`, ...).
        field: &'static str,
        /// Value obtained by scanning the indices.
        expected: usize,
        /// Value returned by `TxTabs::count`.
        actual: usize,
    },
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyFailure::BySenderMismatch(h) => write!(f, "{h:?} missing from BySenderIndex"),
            VerifyFailure::ByTipMismatch(h) => write!(f, "{h:?} missing from ByTipIndex"),
            VerifyFailure::ByTipCapMismatch(h) => write!(f, "{h:?} missing from ByTipCapIndex"),
            VerifyFailure::NonceOrder {
                sender,
                first,
                second,
            } => write!(
                f,
                "{sender:?} nonce order broken: {first} arrived before {second}"
            ),
            VerifyFailure::CountMismatch {
                field,
                expected,
                actual,
            } => write!(f, "count.{field} = {actual}, scan found {expected}"),
        }
    }
}

impl std::error::Error for VerifyFailure {}
