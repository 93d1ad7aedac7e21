//! Opaline State Commitments
//!
//! Binds an ordered list of ciphertext handles to a fixed-size digest.
//!
//! ```text
//! StateCommitment = BLAKE3( tag || instance_id || count || h_0 || ... || h_n-1 )
//! ```
//!
//! A decryption request captures this digest at request time; the callback
//! path recomputes it over the ledger's current handles and refuses to
//! finalize if the two differ. Absorbing the instance identity keeps a
//! commitment produced by one deployment from being replayed against
//! another.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use opaline_record::CiphertextHandle;

/// Domain separation tag for commitment hashing.
const COMMITMENT_DOMAIN: &[u8] = b"opaline.commitment.v1";

/// Identity of a registry deployment (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InstanceId(pub [u8; 32]);

impl InstanceId {
    /// Derives an instance identity from a human-readable deployment label.
    /// Formula: SHA256( label_bytes )
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A commitment digest over an ordered handle list (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct StateCommitment(pub [u8; 32]);

impl StateCommitment {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for StateCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Commits to an ordered handle list under a registry instance identity.
///
/// Deterministic and order-sensitive: permuting the handles, or evaluating
/// under a different instance, yields a different digest. The handle count
/// is absorbed so list boundaries are unambiguous.
pub fn commit_handles(handles: &[CiphertextHandle], instance: &InstanceId) -> StateCommitment {
    let mut hasher = blake3::Hasher::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(&instance.0);
    hasher.update(&(handles.len() as u64).to_le_bytes());
    for handle in handles {
        hasher.update(handle.as_bytes());
    }
    StateCommitment(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(seeds: &[u8]) -> Vec<CiphertextHandle> {
        seeds.iter().map(|&s| CiphertextHandle([s; 32])).collect()
    }

    #[test]
    fn commitment_is_deterministic() {
        let instance = InstanceId::from_label("test");
        let list = handles(&[1, 2, 3]);

        let c1 = commit_handles(&list, &instance);
        let c2 = commit_handles(&list, &instance);

        assert_eq!(c1, c2, "same inputs should produce same commitment");
    }

    #[test]
    fn commitment_is_order_sensitive() {
        let instance = InstanceId::from_label("test");

        let c1 = commit_handles(&handles(&[1, 2, 3]), &instance);
        let c2 = commit_handles(&handles(&[3, 2, 1]), &instance);

        assert_ne!(c1, c2, "permuted handles should produce different commitments");
    }

    #[test]
    fn commitment_binds_instance_identity() {
        let list = handles(&[1, 2, 3]);

        let c1 = commit_handles(&list, &InstanceId::from_label("deployment-a"));
        let c2 = commit_handles(&list, &InstanceId::from_label("deployment-b"));

        assert_ne!(
            c1, c2,
            "different instances should produce different commitments"
        );
    }

    #[test]
    fn empty_and_single_lists_differ() {
        let instance = InstanceId::from_label("test");

        let c_empty = commit_handles(&[], &instance);
        let c_one = commit_handles(&handles(&[0]), &instance);

        assert_ne!(c_empty, c_one);
    }
}
