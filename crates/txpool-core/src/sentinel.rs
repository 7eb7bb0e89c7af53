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

//! Sentinel values shared by the tip/tip-cap indices and the driver's
//! `GetBaseFee`/`SetBaseFee` jobs.

/// Effective gas tip or gas-tip cap.
///
/// Signed because `effective_gas_tip` can go negative under EIP-1559 when
/// `max_fee < base_fee + max_priority_fee`. A native `i128` is used instead
/// of an arbitrary-precision integer: real gas prices never approach its
/// range, and the sorted multimaps need a `Copy` key.
pub type Tip = i128;

/// Disables base-fee adjustment for `effective_gas_tip` (legacy pricing
/// only). Exposed at the driver boundary wherever the spec calls for the
/// sentinel explicitly (`GetBaseFee`'s reply when no base fee is set); the
/// crate's own API prefers `Option<U256>` internally.
pub const TX_NO_BASE_FEE: Tip = Tip::MIN;
