// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types: the engine queue/result message schemas (§6.3, §6.4), the
//! gateway-facing DTOs (§6.1, §4.8), and the health/metrics payload shapes.
//!
//! Wire format for the daemon/engine IPC channel: 4-byte length prefix
//! (big-endian) + JSON payload.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod gateway;
mod health;
mod queue;
mod result;

pub use codec::{decode, encode, read_message, write_message, ProtocolError};
pub use gateway::{
    EngineRecord, JobRecord, SessionTicket, SubmitRequest, TaskRecord,
};
pub use health::{HealthStatus, MetricsHealthSummary};
pub use queue::{EngineQueueInput, EngineQueueMessage};
pub use result::{EngineResultMessage, ResultOutput};
