/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The thread that distributes published [events](crate::events) to registered handlers.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::thread::JoinHandle;

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

pub(crate) struct EventHandlers {
    pub(crate) accept_submission_handlers: Vec<HandlerPtr<AcceptSubmissionEvent>>,
    pub(crate) accept_vote_handlers: Vec<HandlerPtr<AcceptVoteEvent>>,
    pub(crate) update_tally_handlers: Vec<HandlerPtr<UpdateTallyEvent>>,
    pub(crate) execute_round_handlers: Vec<HandlerPtr<ExecuteRoundEvent>>,
    pub(crate) start_round_handlers: Vec<HandlerPtr<StartRoundEvent>>,
}

impl EventHandlers {
    pub(crate) fn new(
        log_events: bool,
        on_accept_submission: Option<HandlerPtr<AcceptSubmissionEvent>>,
        on_accept_vote: Option<HandlerPtr<AcceptVoteEvent>>,
        on_update_tally: Option<HandlerPtr<UpdateTallyEvent>>,
        on_execute_round: Option<HandlerPtr<ExecuteRoundEvent>>,
        on_start_round: Option<HandlerPtr<StartRoundEvent>>,
    ) -> EventHandlers {
        let mut handlers = EventHandlers {
            accept_submission_handlers: Vec::new(),
            accept_vote_handlers: Vec::new(),
            update_tally_handlers: Vec::new(),
            execute_round_handlers: Vec::new(),
            start_round_handlers: Vec::new(),
        };

        if log_events {
            handlers
                .accept_submission_handlers
                .push(AcceptSubmissionEvent::get_logger());
            handlers.accept_vote_handlers.push(AcceptVoteEvent::get_logger());
            handlers.update_tally_handlers.push(UpdateTallyEvent::get_logger());
            handlers
                .execute_round_handlers
                .push(ExecuteRoundEvent::get_logger());
            handlers.start_round_handlers.push(StartRoundEvent::get_logger());
        }

        if let Some(handler) = on_accept_submission {
            handlers.accept_submission_handlers.push(handler)
        }
        if let Some(handler) = on_accept_vote {
            handlers.accept_vote_handlers.push(handler)
        }
        if let Some(handler) = on_update_tally {
            handlers.update_tally_handlers.push(handler)
        }
        if let Some(handler) = on_execute_round {
            handlers.execute_round_handlers.push(handler)
        }
        if let Some(handler) = on_start_round {
            handlers.start_round_handlers.push(handler)
        }

        handlers
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.accept_submission_handlers.is_empty()
            && self.accept_vote_handlers.is_empty()
            && self.update_tally_handlers.is_empty()
            && self.execute_round_handlers.is_empty()
            && self.start_round_handlers.is_empty()
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::AcceptSubmission(accept_submission_event) => self
                .accept_submission_handlers
                .iter()
                .for_each(|handler| handler(&accept_submission_event)),

            Event::AcceptVote(accept_vote_event) => self
                .accept_vote_handlers
                .iter()
                .for_each(|handler| handler(&accept_vote_event)),

            Event::UpdateTally(update_tally_event) => self
                .update_tally_handlers
                .iter()
                .for_each(|handler| handler(&update_tally_event)),

            Event::ExecuteRound(execute_round_event) => self
                .execute_round_handlers
                .iter()
                .for_each(|handler| handler(&execute_round_event)),

            Event::StartRound(start_round_event) => self
                .start_round_handlers
                .iter()
                .for_each(|handler| handler(&start_round_event)),
        }
    }
}

pub(crate) fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("event_bus thread disconnected from main thread")
            }
        }

        match event_subscriber.try_recv() {
            Ok(event) => event_handlers.fire_handlers(event),
            Err(TryRecvError::Empty) => thread::yield_now(),
            Err(TryRecvError::Disconnected) => {
                panic!("The scheduler and engine (event publishers) were disconnected from the channel")
            }
        }
    })
}
