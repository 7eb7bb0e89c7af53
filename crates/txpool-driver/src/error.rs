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

//! Driver-level failures. Never raised by caller input going through a job
//! reply (those surface as `RejectReason` from `txpool-core` instead); this
//! enum is for the queue plumbing itself.

use std::fmt;

/// Failure submitting or running a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The worker has stopped (an `Abort` job already drained the queue)
    /// and is no longer receiving.
    QueueShutdown,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::QueueShutdown => write!(f, "job queue has been shut down"),
        }
    }
}

impl std::error::Error for JobError {}
