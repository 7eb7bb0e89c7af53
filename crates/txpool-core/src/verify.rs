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

//! Debug-only cross-index consistency check (§8's quantified invariants).
//! Built entirely on `TxTabs`'s own public read API so it can never see
//! anything a real caller couldn't — if it ever fails outside a test, that's
//! a bug in the mutation path, not in this checker.

use crate::{error::VerifyFailure, item::Status, transaction::PoolTransaction, txtabs::TxTabs};

pub(crate) fn verify<T: PoolTransaction>(tabs: &TxTabs<T>) -> Result<(), Vec<VerifyFailure>> {
    let mut failures = Vec::new();

    let mut total = 0usize;
    let (mut local_n, mut remote_n) = (0usize, 0usize);
    let mut by_status: std::collections::HashMap<Status, usize> =
        Status::ALL.iter().map(|&s| (s, 0usize)).collect();

    for local in [true, false] {
        for item in tabs.by_id().iter_arrival(local) {
            total += 1;
            if local {
                local_n += 1;
            } else {
                remote_n += 1;
            }
            *by_status.get_mut(&item.status()).expect("Status::ALL covers every variant") += 1;

            let reachable_via_sender = tabs
                .by_sender()
                .get(&item.sender)
                .map_or(false, |sched| sched.any().contains(item.nonce(), &item.id));
            if !reachable_via_sender {
                failures.push(VerifyFailure::BySenderMismatch(item.id));
            }

            let tip = item.effective_gas_tip(tabs.base_fee());
            if !tabs.by_tip().contains(tip, item.nonce(), &item.id) {
                failures.push(VerifyFailure::ByTipMismatch(item.id));
            }

            let tip_cap = item.gas_tip_cap();
            if !tabs.by_tip_cap().contains(tip_cap, item.nonce(), &item.id) {
                failures.push(VerifyFailure::ByTipCapMismatch(item.id));
            }
        }
    }

    for sender in tabs.by_sender().senders() {
        let sched = tabs.by_sender().get(sender).expect("sender came from senders() iterator");
        let mut last_nonce: Option<u64> = None;
        for item in sched.any().iter_asc() {
            if let Some(prev) = last_nonce {
                if item.nonce() < prev {
                    failures.push(VerifyFailure::NonceOrder {
                        sender: *sender,
                        first: prev,
                        second: item.nonce(),
                    });
                }
            }
            last_nonce = Some(item.nonce());
        }
    }

    let counts = tabs.count();
    let mut check = |field: &'static str, expected: usize, actual: usize| {
        if expected != actual {
            failures.push(VerifyFailure::CountMismatch { field, expected, actual });
        }
    };
    check("total", total, counts.total);
    check("local", local_n, counts.local);
    check("remote", remote_n, counts.remote);
    check("queued", by_status[&Status::Queued], counts.queued);
    check("pending", by_status[&Status::Pending], counts.pending);
    check("staged", by_status[&Status::Staged], counts.staged);

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
