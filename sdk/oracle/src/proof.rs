//! Reply authenticity primitives.
//!
//! A reply's proof is the oracle's Ed25519 signature over
//! `BLAKE3(tag || request_id || len(cleartexts) || cleartexts)`. Hashing the
//! request id into the signed message pins each proof to one request.

use std::fmt;

use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Domain separation tag for the signed reply digest.
const PROOF_DOMAIN: &[u8] = b"opaline.oracle.proof.v1";

/// Oracle-assigned decryption request identifier (32 bytes, globally unique).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RequestId(pub [u8; 32]);

impl RequestId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// An oracle's proof of reply authenticity (Ed25519 signature bytes).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct OracleProof(pub Vec<u8>);

impl OracleProof {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A complete asynchronous reply from the oracle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleReply {
    pub request_id: RequestId,
    /// Fixed-width cleartext payload, one value per decrypted handle.
    pub cleartexts: Vec<u8>,
    pub proof: OracleProof,
}

/// The digest an oracle signs for a reply.
pub fn proof_digest(request_id: &RequestId, cleartexts: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(PROOF_DOMAIN);
    hasher.update(&request_id.0);
    hasher.update(&(cleartexts.len() as u64).to_le_bytes());
    hasher.update(cleartexts);
    *hasher.finalize().as_bytes()
}

/// Verifies a reply proof against the oracle's verifying key.
///
/// Returns false for malformed signature bytes rather than erroring; the
/// caller treats any failure as an inauthentic reply.
pub fn verify_reply_signature(
    verifying: &VerifyingKey,
    request_id: &RequestId,
    cleartexts: &[u8],
    proof: &OracleProof,
) -> bool {
    let Ok(signature) = Signature::from_slice(&proof.0) else {
        return false;
    };
    let digest = proof_digest(request_id, cleartexts);
    verifying.verify_strict(&digest, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_binds_request_id() {
        let cleartexts = [7u8; 16];
        let d1 = proof_digest(&RequestId([1; 32]), &cleartexts);
        let d2 = proof_digest(&RequestId([2; 32]), &cleartexts);
        assert_ne!(d1, d2);
    }

    #[test]
    fn digest_binds_cleartexts() {
        let id = RequestId([1; 32]);
        let d1 = proof_digest(&id, &[0u8; 8]);
        let d2 = proof_digest(&id, &[1u8; 8]);
        assert_ne!(d1, d2);
    }
}
