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

//! Synthetic transaction/address/hash fixtures.
//!
//! This crate has no real RLP decoder or secp256k1 recovery (both are
//! external collaborators per the crate docs), so tests build pools out of
//! `TestTransaction`, a deterministic stand-in that implements
//! `PoolTransaction` directly.

use ethereum_types::{Address, H256, U256};

use crate::transaction::PoolTransaction;

/// Deterministic address derived from a small integer seed.
pub fn address(seed: u64) -> Address {
    Address::from_low_u64_be(seed)
}

/// Deterministic hash derived from a small integer seed.
pub fn hash(seed: u64) -> H256 {
    H256::from_low_u64_be(seed)
}

/// A fully synthetic, already "RLP-decoded" transaction.
#[derive(Debug, Clone)]
pub struct TestTransaction {
    hash: H256,
    nonce: u64,
    gas_limit: u64,
    value: U256,
    gas_price_or_max_fee: U256,
    max_priority_fee_per_gas: U256,
    eip1559: bool,
    sender: Option<Address>,
}

impl TestTransaction {
    /// A legacy transaction from the sender derived from `sender_seed`, at
    /// the given `nonce`, with a default gas price of 20.
    pub fn new(sender_seed: u64, nonce: u64) -> Self {
        TestTransaction {
            hash: hash(sender_seed.wrapping_mul(1_000_003).wrapping_add(nonce) + 1),
            nonce,
            gas_limit: 21_000,
            value: U256::zero(),
            gas_price_or_max_fee: U256::from(20),
            max_priority_fee_per_gas: U256::from(20),
            eip1559: false,
            sender: Some(address(sender_seed)),
        }
    }

    /// Turns this into an EIP-1559 transaction with the given fee cap and
    /// priority fee.
    pub fn eip1559(mut self, max_fee: u64, max_priority_fee: u64) -> Self {
        self.eip1559 = true;
        self.gas_price_or_max_fee = U256::from(max_fee);
        self.max_priority_fee_per_gas = U256::from(max_priority_fee);
        self
    }

    /// Overrides the legacy gas price (no-op for EIP-1559 transactions built
    /// after this call).
    pub fn gas_price(mut self, price: u64) -> Self {
        self.gas_price_or_max_fee = U256::from(price);
        self.max_priority_fee_per_gas = U256::from(price);
        self
    }

    /// Forces `recover_sender` to fail, as if the signature were bad.
    pub fn invalid_sender(mut self) -> Self {
        self.sender = None;
        self
    }

    /// Pins this transaction's hash explicitly, overriding the derived one.
    pub fn with_hash(mut self, h: H256) -> Self {
        self.hash = h;
        self
    }
}

impl PoolTransaction for TestTransaction {
    fn hash(&self) -> H256 {
        self.hash
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn gas_price_or_max_fee(&self) -> U256 {
        self.gas_price_or_max_fee
    }

    fn max_priority_fee_per_gas(&self) -> U256 {
        self.max_priority_fee_per_gas
    }

    fn is_eip1559(&self) -> bool {
        self.eip1559
    }

    fn recover_sender(&self) -> Option<Address> {
        self.sender
    }
}

/// Shorthand for `TestTransaction::new(sender_seed, nonce)`, used throughout
/// the in-file unit tests.
pub fn tx(sender_seed: u64, nonce: u64) -> TestTransaction {
    TestTransaction::new(sender_seed, nonce)
}
