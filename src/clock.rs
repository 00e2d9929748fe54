/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](Clock) for clocks: the time source the scheduler uses to detect round
//! boundaries.
//!
//! Round boundaries are detected by a modulo test on whole seconds, so the clock only has to be
//! monotonic enough for that: it should not jump backwards across a boundary. Production code
//! uses [SystemClock]; tests inject a manually stepped clock to drive boundaries
//! deterministically.

use std::time::SystemTime;

use crate::types::Timestamp;

pub trait Clock: Send + 'static {
    /// The current time, in whole seconds since the Unix Epoch.
    fn now(&mut self) -> Timestamp;
}

/// A clock that reads the operating system's wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Timestamp {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("System clock is set before the Unix Epoch.")
            .as_secs()
    }
}
