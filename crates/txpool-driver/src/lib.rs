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

//! Single-threaded job-queue driver around `txpool_core::TxTabs`.
//!
//! `TxTabs` itself has no threading opinions; this crate is the node-facing
//! consumer that wraps it in one worker (`Driver::run`) reachable only
//! through typed `Job`s with reply channels. Only the submission side of
//! the queue is meant to be shared across threads — the worker is the
//! single writer the whole multi-index store requires (see
//! `txpool-core`'s crate docs on the concurrency model).

#![warn(missing_docs)]

mod driver;
mod error;
mod job;
mod options;

pub mod test_utils;

pub use crate::{
    driver::Driver,
    error::JobError,
    job::{Job, JobHandle, JobId, JobQueue, TX_JOB_ID_MAX},
    options::Options,
};
