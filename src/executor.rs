/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](CommandExecutor) for command executors: user-provided types that run the
//! winning command of a round.
//!
//! The engine assumes nothing about what executing a command means. Implementations may
//! interpret a language inside a sandbox, shell out, or apply the text to some in-memory
//! environment; the engine only sees the typed [ExecutionOutcome]. This keeps arbitrary code
//! execution strictly behind an injected capability, so tests can substitute a scripted stub.

use crate::types::ExecutionOutcome;

/// # Error containment
///
/// `execute` is called on the scheduler thread, outside any state lock. Implementations must
/// capture every failure mode of the command as [ExecutionOutcome::Failure] rather than
/// panicking: a panic here takes down the scheduler, and with it round progression.
pub trait CommandExecutor: Send + 'static {
    /// Run `command` against the shared environment, returning the rendered result or the
    /// rendered error.
    fn execute(&mut self, command: &str) -> ExecutionOutcome;
}
