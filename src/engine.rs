/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Methods to build, run, and interact with an agora engine.
//!
//! An engine owns the single authoritative [round state](crate::state) of the process, the
//! scheduler thread that advances it, and the event bus that fans out
//! [events](crate::events) to registered handlers.
//!
//! The key components of this module are:
//! - The builder-pattern interface to construct a [specification of the engine](EngineSpec) with:
//!   1. `EngineSpec::builder` to construct an `EngineSpecBuilder`,
//!   2. The setters of the `EngineSpecBuilder`, and
//!   3. The `EngineSpecBuilder::build` method to construct an [EngineSpec],
//! - The function to [start](EngineSpec::start) an [Engine] given its specification,
//! - [The type](Engine) which keeps the engine alive and exposes its entry points.
//!
//! ## Starting an engine
//!
//! Here is an example that demonstrates how to build and start running an engine using the
//! builder pattern:
//!
//! ```ignore
//! let engine =
//!     EngineSpec::builder()
//!     .executor(executor)
//!     .clock(SystemClock)
//!     .configuration(configuration)
//!     .on_execute_round(execute_handler)
//!     .build()
//!     .start()
//! ```
//!
//! ### Required setters
//!
//! The required setters are for providing the trait implementations and parameters required to
//! run an engine:
//! - `.executor(...)`
//! - `.clock(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters are for registering user-defined event handlers for events from
//! [crate::events]:
//! - `.on_accept_submission(...)`
//! - `.on_accept_vote(...)`
//! - `.on_update_tally(...)`
//! - `.on_execute_round(...)`
//! - `.on_start_round(...)`
//!
//! ## Entry points
//!
//! Request handlers mutate the engine through the two gated entry points, [submit](Engine::submit)
//! and [vote](Engine::vote), which take the *raw client address* and derive the anonymous
//! identity internally; no raw address ever reaches the state. Reads go through the
//! [camera](Engine::camera), and observers interested in "something changed" signals
//! [subscribe](Engine::subscribe). All entry points take `&self`: one `Engine` value can be
//! shared by any number of request-handling threads.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use typed_builder::TypedBuilder;

use crate::clock::Clock;
use crate::config::Configuration;
use crate::event_bus::*;
use crate::events::*;
use crate::executor::CommandExecutor;
use crate::identity::IdentityHasher;
use crate::notifier::{ChangeNotifier, SubscriberId};
use crate::scheduler::start_scheduler;
use crate::state::{RoundStateCamera, SharedRoundState, SubmitOutcome, VoteOutcome};
use crate::types::Identity;

/// Stores all necessary parameters and trait implementations required to run an [Engine].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building an [EngineSpec]. On the builder call the following methods to construct a valid [EngineSpec].

    Required:
    - `.executor(...)`
    - `.clock(...)`
    - `.configuration(...)`

    Optional:
    - `.on_accept_submission(...)`
    - `.on_accept_vote(...)`
    - `.on_update_tally(...)`
    - `.on_execute_round(...)`
    - `.on_start_round(...)`
"))]
pub struct EngineSpec<E: CommandExecutor + 'static, C: Clock + 'static> {
    // Required parameters
    #[builder(setter(doc = "Set the execution capability that winning commands are run against. The argument must implement the [CommandExecutor](crate::executor::CommandExecutor) trait. Required."))]
    executor: E,
    #[builder(setter(doc = "Set the time source used for round-boundary detection. The argument must implement the [Clock](crate::clock::Clock) trait. Required."))]
    clock: C,
    #[builder(setter(doc = "Set the [configuration](Configuration), which contains the necessary parameters to run an engine. Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&AcceptSubmissionEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<AcceptSubmissionEvent>),
    doc = "Register a handler closure to be invoked after a submission passes the gate. Optional."))]
    on_accept_submission: Option<HandlerPtr<AcceptSubmissionEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&AcceptVoteEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<AcceptVoteEvent>),
    doc = "Register a handler closure to be invoked after a vote passes the gate. Optional."))]
    on_accept_vote: Option<HandlerPtr<AcceptVoteEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&UpdateTallyEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<UpdateTallyEvent>),
    doc = "Register a handler closure to be invoked after a scheduler tick changes the cached tally. Optional."))]
    on_update_tally: Option<HandlerPtr<UpdateTallyEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ExecuteRoundEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ExecuteRoundEvent>),
    doc = "Register a handler closure to be invoked after a round's winning command is executed and archived. Optional."))]
    on_execute_round: Option<HandlerPtr<ExecuteRoundEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&StartRoundEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<StartRoundEvent>),
    doc = "Register a handler closure to be invoked after a new round begins. Optional."))]
    on_start_round: Option<HandlerPtr<StartRoundEvent>>,
}

impl<E: CommandExecutor + 'static, C: Clock + 'static> EngineSpec<E, C> {
    /// Starts all threads and channels associated with running an engine, and returns the
    /// handles to them in an [Engine] struct.
    pub fn start(mut self) -> Engine {
        let initial_time = self.clock.now();
        let state = SharedRoundState::new(initial_time);
        let hasher = IdentityHasher::random();
        let notifier = Arc::new(ChangeNotifier::new());

        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_accept_submission,
            self.on_accept_vote,
            self.on_update_tally,
            self.on_execute_round,
            self.on_start_round,
        );

        let (event_publisher, event_subscriber) = if !event_handlers.is_empty() {
            Some(mpsc::channel()).unzip()
        } else {
            (None, None)
        };

        let (scheduler_shutdown, scheduler_shutdown_receiver) = mpsc::channel();
        let scheduler = start_scheduler(
            self.executor,
            self.clock,
            state.clone(),
            Arc::clone(&notifier),
            self.configuration.round_duration,
            self.configuration.tick_interval,
            scheduler_shutdown_receiver,
            event_publisher.clone(),
        );

        let (event_bus_shutdown, event_bus_shutdown_receiver) = if !event_handlers.is_empty() {
            Some(mpsc::channel()).unzip()
        } else {
            (None, None)
        };

        let event_bus = if !event_handlers.is_empty() {
            Some(start_event_bus(
                event_handlers,
                event_subscriber.unwrap(), // Safety: should be Some(...).
                event_bus_shutdown_receiver.unwrap(), // Safety: should be Some(...).
            ))
        } else {
            None
        };

        Engine {
            camera: RoundStateCamera::new(state.clone()),
            state,
            hasher,
            notifier,
            max_submission_size: self.configuration.max_submission_size,
            event_publisher,
            scheduler: Some(scheduler),
            scheduler_shutdown,
            event_bus,
            event_bus_shutdown,
        }
    }
}

/// A handle to the state and background threads of an agora engine. When this value is dropped,
/// all background threads are gracefully shut down.
pub struct Engine {
    camera: RoundStateCamera,
    state: SharedRoundState,
    hasher: IdentityHasher,
    notifier: Arc<ChangeNotifier>,
    max_submission_size: usize,
    event_publisher: Option<Sender<Event>>,
    scheduler: Option<JoinHandle<()>>,
    scheduler_shutdown: Sender<()>,
    event_bus: Option<JoinHandle<()>>,
    event_bus_shutdown: Option<Sender<()>>,
}

impl Engine {
    /// The anonymous identity of a raw client address, for presentation layers that want to show
    /// participants which candidate is "theirs". Stable for the lifetime of this engine.
    pub fn identify(&self, raw_address: &str) -> Identity {
        self.hasher.identify(raw_address)
    }

    /// Submit a candidate command on behalf of `raw_address`. One submission per identity per
    /// round; oversized commands are rejected without mutating anything.
    pub fn submit(&self, raw_address: &str, command: &str) -> SubmitOutcome {
        let identity = self.hasher.identify(raw_address);
        self.state
            .submit(identity, command, self.max_submission_size, &self.event_publisher)
    }

    /// Vote for `target` on behalf of `raw_address`. One vote per identity per round; voting for
    /// oneself is rejected, since self-support is already implicit. The target does not need to
    /// have a submission.
    pub fn vote(&self, raw_address: &str, target: Identity) -> VoteOutcome {
        let voter = self.hasher.identify(raw_address);
        self.state.vote(voter, target, &self.event_publisher)
    }

    /// Returns a [camera](crate::state::RoundStateCamera) which can be used to take consistent
    /// snapshots of the round state.
    pub fn camera(&self) -> &RoundStateCamera {
        &self.camera
    }

    /// Register an observer to be woken whenever the visible state changes. See
    /// [ChangeNotifier](crate::notifier::ChangeNotifier).
    pub fn subscribe(&self) -> (SubscriberId, Receiver<()>) {
        self.notifier.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.notifier.unsubscribe(id)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Safety: the order of thread shutdown in this function is important. The scheduler
        // publishes to the event bus, so the bus must outlive it; the scheduler goes down first.

        self.scheduler_shutdown.send(()).unwrap();
        self.scheduler.take().unwrap().join().unwrap();

        self.event_bus_shutdown
            .iter()
            .for_each(|shutdown| shutdown.send(()).unwrap());
        if self.event_bus.is_some() {
            self.event_bus.take().unwrap().join().unwrap();
        }
    }
}
