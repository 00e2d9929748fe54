/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Computation of ranked standings from the active round's submissions and votes.

use std::collections::HashMap;

use crate::types::{Identity, Submission, TallyEntry, Vote, VoteCount};

/// Compute the ranked standings of the active round.
///
/// Every identity with a submission implicitly casts one vote for itself, *unless* it has cast an
/// explicit vote this round, in which case the explicit vote replaces the self-vote: a submitter
/// who also votes counts exactly once, for their chosen target. Explicit votes whose target has
/// no submission contribute nothing, and such targets get no entry.
///
/// Entries are ordered by vote count descending. Ties are broken by submission order, earliest
/// first, so that the output is deterministic for a fixed input.
///
/// This is a pure function: it reads the given slices and touches nothing else.
pub fn compute_tally(submissions: &[Submission], votes: &[Vote]) -> Vec<TallyEntry> {
    let mut effective_votes: HashMap<Identity, VoteCount> = HashMap::new();

    for submission in submissions {
        let has_explicit_vote = votes.iter().any(|vote| vote.voter == submission.identity);
        if !has_explicit_vote {
            *effective_votes.entry(submission.identity).or_insert(0) += 1;
        }
    }

    for vote in votes {
        *effective_votes.entry(vote.target).or_insert(0) += 1;
    }

    // Building entries in submission order and sorting stably by count gives the
    // earliest-submission tie-break.
    let mut entries: Vec<TallyEntry> = submissions
        .iter()
        .map(|submission| TallyEntry {
            identity: submission.identity,
            command: submission.command.clone(),
            votes: effective_votes.get(&submission.identity).copied().unwrap_or(0),
        })
        .collect();
    entries.sort_by(|a, b| b.votes.cmp(&a.votes));

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(tag: u8) -> Identity {
        Identity::new([tag; 32])
    }

    fn submission(tag: u8, command: &str) -> Submission {
        Submission {
            identity: identity(tag),
            command: command.to_string(),
        }
    }

    fn vote(voter: u8, target: u8) -> Vote {
        Vote {
            voter: identity(voter),
            target: identity(target),
        }
    }

    #[test]
    fn submitters_self_vote_by_default() {
        let submissions = vec![submission(1, "a"), submission(2, "b")];
        let tally = compute_tally(&submissions, &[]);
        assert_eq!(tally.len(), 2);
        assert!(tally.iter().all(|entry| entry.votes == 1));
    }

    #[test]
    fn explicit_vote_adds_to_target() {
        // A and B submit, C votes for A: A = self + C = 2, B = self = 1.
        let submissions = vec![submission(1, "a"), submission(2, "b")];
        let votes = vec![vote(3, 1)];
        let tally = compute_tally(&submissions, &votes);
        assert_eq!(tally[0].identity, identity(1));
        assert_eq!(tally[0].votes, 2);
        assert_eq!(tally[1].identity, identity(2));
        assert_eq!(tally[1].votes, 1);
    }

    #[test]
    fn explicit_vote_overrides_self_vote() {
        // Continuing the scenario above, A votes for B: A loses its self-vote, so
        // A = C only = 1, B = self + A = 2.
        let submissions = vec![submission(1, "a"), submission(2, "b")];
        let votes = vec![vote(3, 1), vote(1, 2)];
        let tally = compute_tally(&submissions, &votes);
        assert_eq!(tally[0].identity, identity(2));
        assert_eq!(tally[0].votes, 2);
        assert_eq!(tally[1].identity, identity(1));
        assert_eq!(tally[1].votes, 1);
    }

    #[test]
    fn votes_for_absent_targets_are_dropped() {
        let submissions = vec![submission(1, "a")];
        let votes = vec![vote(2, 9), vote(3, 9)];
        let tally = compute_tally(&submissions, &votes);
        assert_eq!(tally.len(), 1);
        assert_eq!(tally[0].identity, identity(1));
        assert_eq!(tally[0].votes, 1);
    }

    #[test]
    fn ties_break_by_earliest_submission() {
        let submissions = vec![submission(2, "b"), submission(1, "a"), submission(3, "c")];
        let tally = compute_tally(&submissions, &[]);
        let order: Vec<Identity> = tally.iter().map(|entry| entry.identity).collect();
        assert_eq!(order, vec![identity(2), identity(1), identity(3)]);
    }

    #[test]
    fn tally_is_deterministic() {
        let submissions = vec![submission(1, "a"), submission(2, "b"), submission(3, "c")];
        let votes = vec![vote(4, 2), vote(1, 3), vote(5, 2)];
        assert_eq!(
            compute_tally(&submissions, &votes),
            compute_tally(&submissions, &votes)
        );
    }

    #[test]
    fn empty_round_yields_empty_tally() {
        assert!(compute_tally(&[], &[]).is_empty());
        // Votes alone elect nobody.
        assert!(compute_tally(&[], &[vote(1, 2)]).is_empty());
    }
}
