/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Configuration as specified by the operator.

use std::time::Duration;

use typed_builder::TypedBuilder;

/// Stores the operator-defined parameters of the engine, that is:
/// 1. The round duration (in whole seconds), which defines where round boundaries fall: a tick
///    that observes a time divisible by the round duration is a boundary tick.
/// 2. The maximum submission size (in characters). Longer submissions are rejected.
/// 3. The tick interval, i.e., how long the scheduler sleeps between ticks. The default of one
///    second matches the one-second granularity of boundary detection; a much larger interval
///    makes the scheduler skip over boundaries.
/// 4. The "Log Events" flag, if set to "true" then logs should be printed.
///
/// ## Log Events
///
/// Agora logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.round_duration(...)`
    - `.max_submission_size(...)`
    - `.log_events(...)`

    Optional:
    - `.tick_interval(...)` (default: 1 second)
"))]
pub struct Configuration {
    #[builder(setter(doc = "Set the round duration in whole seconds. Must be non-zero. Required."))]
    pub round_duration: u64,
    #[builder(setter(doc = "Set the maximum accepted submission length in characters. Required."))]
    pub max_submission_size: usize,
    #[builder(default = Duration::from_secs(1), setter(doc = "Set the scheduler's tick interval. Optional: defaults to 1 second."))]
    pub tick_interval: Duration,
    #[builder(setter(doc = "Enable logging? Required."))]
    pub log_events: bool,
}
