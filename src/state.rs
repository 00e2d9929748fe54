/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types and methods used to access and mutate the state that the engine keeps track of for the
//! active round, and for the permanent execution history.
//!
//! ## State variables
//!
//! Agora structures its state into separate conceptual 'variables' held in a single
//! [RoundState]:
//! - **Current Time** ([Timestamp]): the time observed by the most recent scheduler tick.
//! - **Round** ([RoundNumber]): the number of the single active round. Incremented by exactly 1
//!   on every execution.
//! - **Submissions** ([Vec<Submission>]): the active round's candidate commands, in insertion
//!   order. At most one per identity.
//! - **Votes** ([Vec<Vote>]): the active round's explicit votes. At most one per voter.
//! - **Tally** ([Vec<TallyEntry>]): the cached ranked standings, refreshed on every tick. A
//!   cache, never a source of truth.
//! - **History** ([Vec<ExecutionRecord>]): the append-only execution ledger. Never mutated or
//!   reordered after append.
//!
//! ## Access pattern
//!
//! All mutations go through [SharedRoundState], whose methods take the write lock once and
//! perform their checks and writes inside that single critical section, so a duplicate check and
//! its insert can never interleave with another request from the same identity. Mutating methods
//! are crate-internal: request handlers reach them through the engine's gated entry points, and
//! the tally refresh and rollover transitions belong to the scheduler thread alone. Mutators
//! publish the corresponding [events](crate::events) after their critical section commits.
//!
//! Readers use a [RoundStateCamera] to take [snapshots](RoundStateSnapshot): owned clones of the
//! committed state taken under the read lock. A snapshot is internally consistent — it can never
//! see an incremented round number alongside the previous round's pending submissions — and
//! holding one blocks nobody.

use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::events::{
    AcceptSubmissionEvent, AcceptVoteEvent, Event, ExecuteRoundEvent, StartRoundEvent,
    UpdateTallyEvent,
};
use crate::tally::compute_tally;
use crate::types::{
    ExecutionOutcome, ExecutionRecord, Identity, RoundNumber, Submission, TallyEntry, Timestamp,
    Vote,
};

/// The result of a gated submission attempt. Rejections leave the state untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitOutcome {
    Accepted,
    /// The command exceeds the configured maximum length in characters.
    RejectedTooLong,
    /// The identity already has a submission in the active round.
    RejectedDuplicate,
}

/// The result of a gated vote attempt. Rejections leave the state untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoteOutcome {
    Accepted,
    /// Voter and target are the same identity. Self-support is implicit (see
    /// [compute_tally](crate::tally::compute_tally)), never explicit.
    RejectedSelfVote,
    /// The voter already cast a vote in the active round.
    RejectedDuplicate,
}

pub(crate) struct RoundState {
    current_time: Timestamp,
    round: RoundNumber,
    submissions: Vec<Submission>,
    votes: Vec<Vote>,
    tally: Vec<TallyEntry>,
    history: Vec<ExecutionRecord>,
}

/// The shared handle to the process' single [RoundState]. Cloning is cheap and every clone
/// refers to the same state.
#[derive(Clone)]
pub(crate) struct SharedRoundState(Arc<RwLock<RoundState>>);

impl SharedRoundState {
    pub(crate) fn new(initial_time: Timestamp) -> SharedRoundState {
        SharedRoundState(Arc::new(RwLock::new(RoundState {
            current_time: initial_time,
            round: 0,
            submissions: Vec::new(),
            votes: Vec::new(),
            tally: Vec::new(),
            history: Vec::new(),
        })))
    }

    /// The submission gate. The length and duplicate checks and the insert happen under one
    /// write-lock acquisition.
    pub(crate) fn submit(
        &self,
        identity: Identity,
        command: &str,
        max_submission_size: usize,
        event_publisher: &Option<Sender<Event>>,
    ) -> SubmitOutcome {
        if command.chars().count() > max_submission_size {
            return SubmitOutcome::RejectedTooLong;
        }

        let (submission, round) = {
            let mut state = self.0.write().unwrap();
            if state
                .submissions
                .iter()
                .any(|submission| submission.identity == identity)
            {
                return SubmitOutcome::RejectedDuplicate;
            }

            let submission = Submission {
                identity,
                command: command.to_string(),
            };
            state.submissions.push(submission.clone());
            (submission, state.round)
        };

        Event::AcceptSubmission(AcceptSubmissionEvent {
            timestamp: SystemTime::now(),
            round,
            submission,
        })
        .publish(event_publisher);
        SubmitOutcome::Accepted
    }

    /// The vote gate. The self-vote and duplicate checks and the insert happen under one
    /// write-lock acquisition. The target is not required to have a submission: dangling votes
    /// are legal and simply count for nothing at tally time.
    pub(crate) fn vote(
        &self,
        voter: Identity,
        target: Identity,
        event_publisher: &Option<Sender<Event>>,
    ) -> VoteOutcome {
        if voter == target {
            return VoteOutcome::RejectedSelfVote;
        }

        let (vote, round) = {
            let mut state = self.0.write().unwrap();
            if state.votes.iter().any(|vote| vote.voter == voter) {
                return VoteOutcome::RejectedDuplicate;
            }

            let vote = Vote { voter, target };
            state.votes.push(vote);
            (vote, state.round)
        };

        Event::AcceptVote(AcceptVoteEvent {
            timestamp: SystemTime::now(),
            round,
            vote,
        })
        .publish(event_publisher);
        VoteOutcome::Accepted
    }

    /// Advance the observed time to `now` and recompute the cached tally. Returns whether the
    /// cached value changed; recomputed-but-equal is not a change.
    pub(crate) fn refresh_tally(
        &self,
        now: Timestamp,
        event_publisher: &Option<Sender<Event>>,
    ) -> bool {
        let (round, tally) = {
            let mut state = self.0.write().unwrap();
            state.current_time = now;

            let tally = compute_tally(&state.submissions, &state.votes);
            if tally == state.tally {
                return false;
            }
            state.tally = tally.clone();
            (state.round, tally)
        };

        Event::UpdateTally(UpdateTallyEvent {
            timestamp: SystemTime::now(),
            round,
            tally,
        })
        .publish(event_publisher);
        true
    }

    /// The head of the cached tally, i.e., the current winner-to-be, if any candidate exists.
    pub(crate) fn tally_head(&self) -> Option<TallyEntry> {
        self.0.read().unwrap().tally.first().cloned()
    }

    /// The round rollover transition. Appends the execution record, increments the round number,
    /// and clears the submissions, votes, and cached tally, all under one write-lock
    /// acquisition: no reader can observe these four effects half-applied.
    ///
    /// The winning command has already been executed by the caller at this point; no lock is
    /// ever held across the execution capability.
    pub(crate) fn rollover(
        &self,
        executed_at: Timestamp,
        winner: TallyEntry,
        outcome: ExecutionOutcome,
        event_publisher: &Option<Sender<Event>>,
    ) -> ExecutionRecord {
        let record = {
            let mut state = self.0.write().unwrap();

            let record = ExecutionRecord {
                round: state.round,
                executed_at,
                identity: winner.identity,
                command: winner.command,
                votes: winner.votes,
                outcome,
            };
            state.history.push(record.clone());
            state.round += 1;
            state.submissions.clear();
            state.votes.clear();
            state.tally.clear();
            record
        };

        Event::ExecuteRound(ExecuteRoundEvent {
            timestamp: SystemTime::now(),
            record: record.clone(),
        })
        .publish(event_publisher);
        Event::StartRound(StartRoundEvent {
            timestamp: SystemTime::now(),
            round: record.round + 1,
        })
        .publish(event_publisher);

        record
    }

    pub(crate) fn snapshot(&self) -> RoundStateSnapshot {
        let state = self.0.read().unwrap();
        RoundStateSnapshot {
            current_time: state.current_time,
            round: state.round,
            tally: state.tally.clone(),
            history: state.history.clone(),
        }
    }
}

/// A read-only handle which can be used to take consistent snapshots of the round state.
pub struct RoundStateCamera {
    state: SharedRoundState,
}

impl RoundStateCamera {
    pub(crate) fn new(state: SharedRoundState) -> RoundStateCamera {
        RoundStateCamera { state }
    }

    /// Clone the latest committed state. Does not block writers beyond the copy itself.
    pub fn snapshot(&self) -> RoundStateSnapshot {
        self.state.snapshot()
    }
}

/// An owned, internally consistent copy of the round state at one instant.
#[derive(Clone, Debug)]
pub struct RoundStateSnapshot {
    current_time: Timestamp,
    round: RoundNumber,
    tally: Vec<TallyEntry>,
    history: Vec<ExecutionRecord>,
}

impl RoundStateSnapshot {
    /// The time observed by the most recent scheduler tick.
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    pub fn round(&self) -> RoundNumber {
        self.round
    }

    /// The cached ranked standings of the active round, best first.
    pub fn tally(&self) -> &[TallyEntry] {
        &self.tally
    }

    /// The execution history, oldest first.
    pub fn history(&self) -> &[ExecutionRecord] {
        &self.history
    }

    /// The execution history, newest first, for presentation layers that render a reverse
    /// chronology.
    pub fn history_newest_first(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.history.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(tag: u8) -> Identity {
        Identity::new([tag; 32])
    }

    #[test]
    fn duplicate_submission_is_rejected_without_mutation() {
        let state = SharedRoundState::new(0);
        assert_eq!(
            state.submit(identity(1), "first", 100, &None),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            state.submit(identity(1), "second", 100, &None),
            SubmitOutcome::RejectedDuplicate
        );

        state.refresh_tally(0, &None);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tally().len(), 1);
        assert_eq!(snapshot.tally()[0].command, "first");
    }

    #[test]
    fn submission_length_is_measured_in_chars() {
        let state = SharedRoundState::new(0);
        assert_eq!(
            state.submit(identity(1), "aaaaa", 5, &None),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            state.submit(identity(2), "aaaaaa", 5, &None),
            SubmitOutcome::RejectedTooLong
        );
        // Five characters, far more than five bytes.
        assert_eq!(
            state.submit(identity(3), "ééééé", 5, &None),
            SubmitOutcome::Accepted
        );
    }

    #[test]
    fn self_vote_is_rejected_without_mutation() {
        let state = SharedRoundState::new(0);
        assert_eq!(
            state.vote(identity(1), identity(1), &None),
            VoteOutcome::RejectedSelfVote
        );
        // The rejection did not consume identity 1's vote for the round.
        assert_eq!(
            state.vote(identity(1), identity(2), &None),
            VoteOutcome::Accepted
        );
    }

    #[test]
    fn second_vote_is_rejected() {
        let state = SharedRoundState::new(0);
        assert_eq!(
            state.vote(identity(1), identity(2), &None),
            VoteOutcome::Accepted
        );
        assert_eq!(
            state.vote(identity(1), identity(3), &None),
            VoteOutcome::RejectedDuplicate
        );
    }

    #[test]
    fn dangling_votes_are_accepted() {
        let state = SharedRoundState::new(0);
        assert_eq!(
            state.vote(identity(1), identity(9), &None),
            VoteOutcome::Accepted
        );
        state.refresh_tally(0, &None);
        assert!(state.snapshot().tally().is_empty());
    }

    #[test]
    fn refresh_tally_reports_changes_only() {
        let state = SharedRoundState::new(0);
        assert!(!state.refresh_tally(1, &None));

        state.submit(identity(1), "a", 100, &None);
        assert!(state.refresh_tally(2, &None));

        // Recomputed-but-equal is not a change.
        assert!(!state.refresh_tally(3, &None));
        assert_eq!(state.snapshot().current_time(), 3);
    }

    #[test]
    fn rollover_applies_all_four_effects() {
        let state = SharedRoundState::new(0);
        state.submit(identity(1), "winner", 100, &None);
        state.vote(identity(2), identity(1), &None);
        state.refresh_tally(9, &None);

        let winner = state.tally_head().unwrap();
        let record = state.rollover(
            10,
            winner,
            ExecutionOutcome::Success("ok".to_string()),
            &None,
        );
        assert_eq!(record.round, 0);
        assert_eq!(record.votes, 2);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.round(), 1);
        assert!(snapshot.tally().is_empty());
        assert_eq!(snapshot.history(), &[record]);

        // The old round's submissions and votes are gone: the same identities act again freely.
        assert_eq!(
            state.submit(identity(1), "again", 100, &None),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            state.vote(identity(2), identity(1), &None),
            VoteOutcome::Accepted
        );
    }

    #[test]
    fn history_orders_agree() {
        let state = SharedRoundState::new(0);
        for round in 0..3 {
            state.submit(identity(1), &format!("cmd {round}"), 100, &None);
            state.refresh_tally(round, &None);
            let winner = state.tally_head().unwrap();
            state.rollover(round, winner, ExecutionOutcome::Success(String::new()), &None);
        }

        let snapshot = state.snapshot();
        let forwards: Vec<RoundNumber> =
            snapshot.history().iter().map(|record| record.round).collect();
        let backwards: Vec<RoundNumber> = snapshot
            .history_newest_first()
            .map(|record| record.round)
            .collect();
        assert_eq!(forwards, vec![0, 1, 2]);
        assert_eq!(backwards, vec![2, 1, 0]);
    }
}
