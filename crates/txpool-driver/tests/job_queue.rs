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

//! End-to-end exercise of `Driver::run` against a real `JobHandle`: submit
//! jobs from a producer thread, read replies on the matching channel, and
//! check the two properties the dual-lane queue exists for — a priority
//! job jumps ahead of already-queued regular jobs, and `Abort` drains
//! in-flight work before the worker stops.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded};
use txpool_core::Status;
use txpool_driver::{Driver, Job, JobError, Options};

use txpool_core::test_utils::tx;

#[test]
fn priority_job_jumps_the_regular_queue() {
    let _ = env_logger::try_init();
    let (mut driver, handle) = Driver::new(Options::default());

    let worker = thread::spawn(move || driver.run(|| 0));

    // Fill the regular lane with a batch of slow-ish inserts first.
    let mut regular_replies = Vec::new();
    for seed in 0..8u64 {
        let (reply_tx, reply_rx) = unbounded();
        handle
            .submit(Job::AddTxs {
                batch: vec![(tx(seed, 0), false, Status::Queued, String::new())],
                reply: reply_tx,
            })
            .unwrap();
        regular_replies.push(reply_rx);
    }

    // Now jump a base-fee read in ahead of them via the priority lane.
    let (price_tx, price_rx) = unbounded();
    handle.submit_priority(Job::GetGasPrice { reply: price_tx }).unwrap();

    let price = price_rx.recv_timeout(Duration::from_secs(5)).expect("priority reply");
    assert_eq!(price, Options::default().minimal_gas_price);

    for rx in regular_replies {
        let results = rx.recv_timeout(Duration::from_secs(5)).expect("regular reply");
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    handle.submit_priority(Job::Abort).unwrap();
    worker.join().expect("worker thread panicked");
}

#[test]
fn abort_drains_queued_work_before_stopping() {
    let (mut driver, handle) = Driver::new(Options::default());
    let worker = thread::spawn(move || driver.run(|| 0));

    let (reply_tx, reply_rx) = bounded(1);
    handle
        .submit(Job::AddTxs {
            batch: vec![(tx(1, 0), false, Status::Queued, String::new())],
            reply: reply_tx,
        })
        .unwrap();

    handle.submit_priority(Job::Abort).unwrap();

    let results = reply_rx.recv_timeout(Duration::from_secs(5)).expect("queued job still ran");
    assert!(results[0].is_ok());
    worker.join().expect("worker thread panicked");
}

#[test]
fn submit_after_abort_reports_shutdown() {
    let (mut driver, handle) = Driver::new(Options::default());
    let worker = thread::spawn(move || driver.run(|| 0));

    handle.submit_priority(Job::Abort).unwrap();
    worker.join().expect("worker thread panicked");

    // `JobHandle` (job.rs) clones only the `Sender` halves; the sole
    // `Receiver`s live inside `JobQueue`, owned by the worker, and are
    // dropped when `driver.run` returns — which happens before
    // `worker.join()` does. By the time we get here neither lane has a
    // receiver left, so the send itself fails.
    let (reply_tx, _reply_rx) = unbounded();
    let submitted = handle.submit(Job::GetGasPrice { reply: reply_tx });
    assert!(matches!(submitted, Err(JobError::QueueShutdown)));
}
