// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dalston engine list` — the gateway's `list_engines` operation (`§4.8`).

use crate::exit_error::ExitError;
use crate::output::{handle_list, OutputFormat};
use clap::{Args, Subcommand};
use dalston_daemon::gateway::Gateway;
use std::io::Write;

#[derive(Args)]
pub struct EngineArgs {
    #[command(subcommand)]
    pub command: EngineCommand,
}

#[derive(Subcommand)]
pub enum EngineCommand {
    /// List the engine catalog, rolled up with live instance status.
    List,
}

pub fn run(
    args: EngineArgs,
    gateway: &Gateway<dalston_core::clock::SystemClock>,
    format: OutputFormat,
) -> Result<(), ExitError> {
    let EngineCommand::List = args.command;
    let engines = gateway.list_engines();
    handle_list(format, &engines, "no engines in the catalog", |engines, out| {
        for engine in engines {
            let _ = writeln!(
                out,
                "{:<24}  {:<12}  {}/{} instances",
                engine.id, engine.stage, engine.available_instances, engine.live_instances
            );
        }
    })
    .map_err(|err| ExitError::new(1, err.to_string()))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
