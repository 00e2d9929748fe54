/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Derivation of stable anonymous identities from raw client addresses.
//!
//! An [IdentityHasher] holds a secret salt drawn from the operating system's CSPRNG at process
//! start. The salt is never persisted and never observable through public state, so identities
//! are stable within a process run but unlinkable to addresses from the outside, and a fresh
//! process re-anonymizes everyone.

use rand_core::{OsRng, RngCore};
use sha2::Digest;

use crate::types::{Identity, IdentityDigest};

/// Derives anonymous identities as `SHA-256(salt ‖ raw_address)`.
pub struct IdentityHasher {
    salt: [u8; 32],
}

impl IdentityHasher {
    /// Create a hasher with a fresh random salt. Called once per process, by the engine.
    pub fn random() -> IdentityHasher {
        let mut salt = [0u8; 32];
        OsRng.fill_bytes(&mut salt);
        IdentityHasher { salt }
    }

    /// Derive the identity of a raw client address. Pure in (salt, address): the same address
    /// always maps to the same identity within a process run.
    pub fn identify(&self, raw_address: &str) -> Identity {
        let mut hasher = IdentityDigest::new();
        hasher.update(self.salt);
        hasher.update(raw_address.as_bytes());
        Identity::new(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_address_same_identity() {
        let hasher = IdentityHasher::random();
        assert_eq!(hasher.identify("203.0.113.7"), hasher.identify("203.0.113.7"));
    }

    #[test]
    fn different_addresses_different_identities() {
        let hasher = IdentityHasher::random();
        assert_ne!(hasher.identify("203.0.113.7"), hasher.identify("203.0.113.8"));
    }

    #[test]
    fn different_salts_unlink_identities() {
        let a = IdentityHasher::random();
        let b = IdentityHasher::random();
        assert_ne!(a.identify("203.0.113.7"), b.identify("203.0.113.7"));
    }

    #[test]
    fn base64_round_trip() {
        let hasher = IdentityHasher::random();
        let identity = hasher.identify("203.0.113.7");
        assert_eq!(Identity::from_base64(&identity.to_base64()), Some(identity));
        assert_eq!(Identity::from_base64("not an identity"), None);
    }
}
