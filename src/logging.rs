/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the engine's
//! [config](crate::config::Configuration).
//!
//! Agora logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following
//! snippet is how an [ExecuteRound](crate::events::ExecuteRoundEvent) is printed:
//!
//! ```text
//! ExecuteRound, 1701329264, 42, Id5u7f6, 3, Success
//! ```
//!
//! In the snippet:
//! - The third value is the executed round's number.
//! - The fourth value is the first seven characters of the Base64 encoding of the winning
//!   identity.
//! - The fifth value is the winner's vote count.
//! - The sixth value is the tag of the execution outcome.

use std::time::SystemTime;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::events::*;
use crate::types::ExecutionOutcome;

// Names of each event in PascalCase for printing:
pub const ACCEPT_SUBMISSION: &str = "AcceptSubmission";
pub const ACCEPT_VOTE: &str = "AcceptVote";
pub const UPDATE_TALLY: &str = "UpdateTally";
pub const EXECUTE_ROUND: &str = "ExecuteRound";
pub const START_ROUND: &str = "StartRound";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for AcceptSubmissionEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |accept_submission_event: &AcceptSubmissionEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                ACCEPT_SUBMISSION,
                secs_since_unix_epoch(accept_submission_event.timestamp),
                accept_submission_event.round,
                first_seven_base64_chars(&accept_submission_event.submission.identity.bytes()),
                accept_submission_event.submission.command.chars().count()
            )
        };
        Box::new(logger)
    }
}

impl Logger for AcceptVoteEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |accept_vote_event: &AcceptVoteEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                ACCEPT_VOTE,
                secs_since_unix_epoch(accept_vote_event.timestamp),
                accept_vote_event.round,
                first_seven_base64_chars(&accept_vote_event.vote.voter.bytes()),
                first_seven_base64_chars(&accept_vote_event.vote.target.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for UpdateTallyEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |update_tally_event: &UpdateTallyEvent| match update_tally_event.tally.first()
        {
            Some(head) => log::debug!(
                "{}, {}, {}, {}, {}, {}",
                UPDATE_TALLY,
                secs_since_unix_epoch(update_tally_event.timestamp),
                update_tally_event.round,
                update_tally_event.tally.len(),
                first_seven_base64_chars(&head.identity.bytes()),
                head.votes
            ),
            None => log::debug!(
                "{}, {}, {}, 0",
                UPDATE_TALLY,
                secs_since_unix_epoch(update_tally_event.timestamp),
                update_tally_event.round
            ),
        };
        Box::new(logger)
    }
}

impl Logger for ExecuteRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |execute_round_event: &ExecuteRoundEvent| {
            let outcome_tag = match execute_round_event.record.outcome {
                ExecutionOutcome::Success(_) => "Success",
                ExecutionOutcome::Failure(_) => "Failure",
            };
            log::info!(
                "{}, {}, {}, {}, {}, {}",
                EXECUTE_ROUND,
                secs_since_unix_epoch(execute_round_event.timestamp),
                execute_round_event.record.round,
                first_seven_base64_chars(&execute_round_event.record.identity.bytes()),
                execute_round_event.record.votes,
                outcome_tag
            )
        };
        Box::new(logger)
    }
}

impl Logger for StartRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_round_event: &StartRoundEvent| {
            log::info!(
                "{}, {}, {}",
                START_ROUND,
                secs_since_unix_epoch(start_round_event.timestamp),
                start_round_event.round
            )
        };
        Box::new(logger)
    }
}

/// Get a readable representation of an identity by taking the first 7 characters of its Base64
/// encoding.
fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("Event occured before the Unix Epoch.")
        .as_secs()
}
