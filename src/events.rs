/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of agora events for event handling and logging.
//! Note: an event for a given action indicates that the action has been completed.

use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::types::{ExecutionRecord, RoundNumber, Submission, TallyEntry, Vote};

pub enum Event {
    // Events caused by gated client mutations.
    AcceptSubmission(AcceptSubmissionEvent),
    AcceptVote(AcceptVoteEvent),
    // Events caused by scheduler ticks.
    UpdateTally(UpdateTallyEvent),
    ExecuteRound(ExecuteRoundEvent),
    StartRound(StartRoundEvent),
}

impl Event {
    pub(crate) fn publish(self, event_publisher: &Option<Sender<Event>>) {
        if let Some(event_publisher) = event_publisher {
            event_publisher.send(self).unwrap()
        }
    }
}

pub struct AcceptSubmissionEvent {
    pub timestamp: SystemTime,
    pub round: RoundNumber,
    pub submission: Submission,
}

pub struct AcceptVoteEvent {
    pub timestamp: SystemTime,
    pub round: RoundNumber,
    pub vote: Vote,
}

pub struct UpdateTallyEvent {
    pub timestamp: SystemTime,
    pub round: RoundNumber,
    pub tally: Vec<TallyEntry>,
}

pub struct ExecuteRoundEvent {
    pub timestamp: SystemTime,
    pub record: ExecutionRecord,
}

pub struct StartRoundEvent {
    pub timestamp: SystemTime,
    pub round: RoundNumber,
}
