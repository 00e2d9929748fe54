/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Agora is a shared, time-sliced election-and-execution engine. Anonymous participants submit
//! candidate commands and vote on them; at fixed wall-clock boundaries the highest-voted command
//! is executed against a user-provided [execution capability](crate::executor::CommandExecutor)
//! and the outcome is archived permanently.
//!
//! The engine is a single authoritative process component: it owns all round state, serves any
//! number of concurrent request-handling threads through gated, atomic entry points, and drives
//! round progression from one scheduler thread. What executing a command *means* — and the
//! rendering of tallies and history — is left to the library user.
//!
//! To get started, implement [CommandExecutor](crate::executor::CommandExecutor) for your
//! sandbox, then build and [start](crate::engine::EngineSpec::start) an engine using
//! [EngineSpec::builder](crate::engine::EngineSpec::builder).

pub mod clock;

pub mod config;

pub mod engine;

pub mod events;

pub mod executor;

pub mod identity;

pub mod logging;

pub mod notifier;

pub mod state;

pub mod tally;

pub mod types;

pub(crate) mod event_bus;

pub(crate) mod scheduler;
