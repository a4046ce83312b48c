// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dalston-engine: the worker loop an engine process runs (C7, §4.5) —
//! register with the Engine Registry, dequeue-and-lease a task, fetch its
//! inputs, run the engine-specific work function, publish outputs, and
//! report completion or failure.

pub mod error;
pub mod work;
pub mod worker;

pub use error::WorkerError;
pub use work::{EngineWork, FetchedInput, WorkOutput};
pub use worker::{Worker, WorkerConfig};
