/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for 'inert' types, i.e., those that are passed around and inspected, but have no active behavior.

use std::fmt;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

pub use sha2::Sha256 as IdentityDigest;

pub type RoundNumber = u64;
pub type Timestamp = u64;
pub type VoteCount = u64;
pub type IdentityBytes = [u8; 32];

/// An opaque, anonymous participant identity.
///
/// Derived by [IdentityHasher](crate::identity::IdentityHasher) as the SHA-256 digest of the
/// process salt concatenated with a raw client address. Stable for the lifetime of the process,
/// and not invertible without the salt.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(IdentityBytes);

impl Identity {
    pub fn new(bytes: IdentityBytes) -> Identity {
        Identity(bytes)
    }

    pub fn bytes(&self) -> IdentityBytes {
        self.0
    }

    /// The canonical string form of an identity, used by presentation layers to name vote targets.
    pub fn to_base64(&self) -> String {
        STANDARD_NO_PAD.encode(self.0)
    }

    /// Parse an identity from the string form produced by [to_base64](Identity::to_base64).
    /// Returns None if the string does not decode to exactly 32 bytes.
    pub fn from_base64(s: &str) -> Option<Identity> {
        let decoded = STANDARD_NO_PAD.decode(s).ok()?;
        let bytes: IdentityBytes = decoded.try_into().ok()?;
        Some(Identity(bytes))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_base64())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// A candidate command submitted by a participant. At most one per identity per round.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Submission {
    pub identity: Identity,
    pub command: String,
}

/// An explicit vote cast by a participant. At most one per identity per round. The target does
/// not have to have a submission in the active round; votes for absent targets contribute nothing
/// to the tally.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Vote {
    pub voter: Identity,
    pub target: Identity,
}

/// One ranked standing in the cached tally. Derived, recomputed on every scheduler tick, and
/// never a source of truth.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TallyEntry {
    pub identity: Identity,
    pub command: String,
    pub votes: VoteCount,
}

/// The result of invoking the execution capability with a winning command. Failures are data,
/// not faults.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExecutionOutcome {
    Success(String),
    Failure(String),
}

/// A permanent entry in the execution history. Immutable once appended.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExecutionRecord {
    pub round: RoundNumber,
    pub executed_at: Timestamp,
    pub identity: Identity,
    pub command: String,
    pub votes: VoteCount,
    pub outcome: ExecutionOutcome,
}
