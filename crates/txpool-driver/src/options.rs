// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

//! Driver-wide configuration, mirroring the shape of the teacher's
//! `verifier::Options`/`txpool::Options` pair but collapsed into one struct
//! since this crate has a single `TxTabs` rather than a scored pool with
//! separate verification/limit concerns.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// Pool-wide limits and pricing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Soft cap on total pool size; `AddTxs` of a remote beyond this is
    /// reported as `TxPoolOverflow` by `Driver::dispatch`'s policy check
    /// before the item ever reaches `TxTabs::insert` (the store itself has
    /// no capacity opinion). Locals are exempt.
    pub max_count: usize,
    /// Soft cap on items per sender, enforced the same way as `max_count`.
    pub max_per_sender: usize,
    /// Wastebasket FIFO capacity (`TxTabs::new`'s `max_rejects`).
    pub max_rejects: usize,
    /// Minimum tip cap a remote transaction must clear, checked by
    /// `Driver::dispatch` before insert (`Underpriced`); locals are exempt.
    /// `SetGasPrice` additionally evicts existing remotes that fall below a
    /// newly raised floor via `TxTabs::drop_below_gas_price`.
    pub minimal_gas_price: U256,
    /// Age, in milliseconds, after which an inactive remote transaction is
    /// eligible for `EvictionInactive`.
    pub lifetime_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_count: 8_192,
            max_per_sender: 16,
            max_rejects: 2_048,
            minimal_gas_price: U256::zero(),
            // Matches the reference client's default queue lifetime of 3 hours.
            lifetime_ms: 3 * 60 * 60 * 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_node_config_file_format() {
        let opts = Options {
            max_count: 4_096,
            max_per_sender: 8,
            max_rejects: 512,
            minimal_gas_price: U256::from(1_000_000_000u64),
            lifetime_ms: 60 * 60 * 1000,
        };
        let json = serde_json::to_string(&opts).unwrap();
        let parsed: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, parsed);
    }
}
