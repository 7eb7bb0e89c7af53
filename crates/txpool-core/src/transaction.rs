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

//! The transaction type this crate stores is opaque: signature recovery and
//! RLP decoding are external collaborators. Anything the store needs to
//! know about a transaction goes through this trait.

use std::fmt;

use ethereum_types::{Address, H256, U256};

/// A signed transaction, already RLP-decoded, whose sender has not
/// necessarily been recovered yet.
///
/// Implementors are expected to be cheap to clone (an `Arc` around the raw
/// payload, typically) since `ItemRef` keeps one around for the lifetime of
/// the pool entry.
pub trait PoolTransaction: fmt::Debug + Send + Sync {
    /// Transaction hash, memoised by the caller if expensive to compute.
    fn hash(&self) -> H256;

    /// Per-sender nonce.
    fn nonce(&self) -> u64;

    /// Maximum gas the transaction may consume.
    fn gas_limit(&self) -> u64;

    /// Value transferred, in wei.
    fn value(&self) -> U256;

    /// `gas_price` for legacy transactions, `max_fee_per_gas` for EIP-1559.
    fn gas_price_or_max_fee(&self) -> U256;

    /// `max_priority_fee_per_gas`; equal to `gas_price_or_max_fee` for
    /// legacy transactions, since there is no separate tip cap.
    fn max_priority_fee_per_gas(&self) -> U256;

    /// `true` for EIP-1559 (type 2) transactions; `false` for legacy and
    /// EIP-2930 transactions, which have no independent tip cap.
    fn is_eip1559(&self) -> bool;

    /// Recover the sender from the transaction's signature.
    ///
    /// Returns `None` if the signature does not recover to a valid address.
    /// This is the only place external verification (secp256k1 recovery)
    /// enters the crate; implementations backed by a real signed
    /// transaction type typically cache the result.
    fn recover_sender(&self) -> Option<Address>;
}
