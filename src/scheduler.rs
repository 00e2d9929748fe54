/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The round scheduler: the thread that drives time forward and turns round boundaries into
//! executions.
//!
//! This module defines the scheduler thread and the procedures used in it. The scheduler is the
//! single driving force of an agora engine: request handlers only deposit submissions and votes,
//! and everything that happens *to* them happens here. The thread is a forever loop of ticks,
//! paced by the configured tick interval. On each tick it:
//! 1. Refreshes the observed current time from the injected [Clock](crate::clock::Clock).
//! 2. Recomputes and caches the tally. If the cached value changed, subscribed observers are
//!    notified and an [UpdateTally](crate::events::UpdateTallyEvent) event is published.
//! 3. Tests the boundary condition: a time divisible by the round duration ends the round. On a
//!    boundary with at least one candidate, [the winner is executed and archived](execute_round);
//!    a boundary with zero candidates does nothing, and in particular does not advance the round
//!    number.
//!
//! The winning command is executed *outside* any state lock, so readers and the gates stay
//! responsive during a slow execution. The execution still happens on this thread, between
//! ticks: the next round cannot be decided until the previous round's command has finished, and
//! a slow command delays subsequent ticks. This serialized-per-round behavior is intended.
//!
//! The loop watches a shutdown channel and exits between ticks, leaving the state uncorrupted
//! for any camera still holding it.

use std::sync::mpsc::Sender;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clock::Clock;
use crate::events::Event;
use crate::executor::CommandExecutor;
use crate::notifier::ChangeNotifier;
use crate::state::SharedRoundState;
use crate::types::Timestamp;

pub(crate) fn start_scheduler<E: CommandExecutor, C: Clock>(
    mut executor: E,
    mut clock: C,
    state: SharedRoundState,
    notifier: Arc<ChangeNotifier>,
    round_duration: u64,
    tick_interval: Duration,
    shutdown_signal: Receiver<()>,
    event_publisher: Option<Sender<Event>>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("scheduler thread disconnected from main thread")
            }
        }

        thread::sleep(tick_interval);

        let now = clock.now();
        tick(now, &mut executor, &state, &notifier, round_duration, &event_publisher);
    })
}

fn tick<E: CommandExecutor>(
    now: Timestamp,
    executor: &mut E,
    state: &SharedRoundState,
    notifier: &ChangeNotifier,
    round_duration: u64,
    event_publisher: &Option<Sender<Event>>,
) {
    if state.refresh_tally(now, event_publisher) {
        notifier.notify_all();
    }

    if now % round_duration == 0 {
        execute_round(now, executor, state, notifier, event_publisher);
    }
}

/// The boundary transition: execute the tally head and roll the state over into the next round.
/// Does nothing if the round has no candidates.
fn execute_round<E: CommandExecutor>(
    now: Timestamp,
    executor: &mut E,
    state: &SharedRoundState,
    notifier: &ChangeNotifier,
    event_publisher: &Option<Sender<Event>>,
) {
    let winner = match state.tally_head() {
        Some(winner) => winner,
        None => return,
    };

    // No state lock is held here: submissions and votes arriving during a slow execution land in
    // the round being rolled over and are cleared with it.
    let outcome = executor.execute(&winner.command);

    state.rollover(now, winner, outcome, event_publisher);
    notifier.notify_all();
}
