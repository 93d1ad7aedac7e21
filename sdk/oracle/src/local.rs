//! Deterministic in-process oracle.
//!
//! Plays the external decryption service for tests, demos, and single-node
//! deployments. Submitted jobs queue until the driver answers them, so the
//! asynchronous gap between request and reply is under test control.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand_core::{OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opaline_record::CiphertextHandle;

use crate::capability::EncryptionCapability;
use crate::proof::{OracleProof, OracleReply, RequestId, proof_digest, verify_reply_signature};

const HANDLE_DOMAIN: &[u8] = b"opaline.oracle.handle.v1";
const REQUEST_DOMAIN: &[u8] = b"opaline.oracle.request.v1";

/// Local oracle errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("handle {handle} is not bound to this oracle")]
    UnknownHandle { handle: CiphertextHandle },
}

/// A decryption job queued by a registry, awaiting an answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecryptionJob {
    pub request_id: RequestId,
    /// Handles to decrypt, in the order the registry committed to them.
    pub handles: Vec<CiphertextHandle>,
}

struct OracleState {
    signing: SigningKey,
    /// Simulated ciphertext store: handle -> plaintext.
    plaintexts: HashMap<CiphertextHandle, u64>,
    jobs: VecDeque<DecryptionJob>,
    next_handle: u64,
    next_request: u64,
}

/// In-process oracle holding its own signing key and plaintext table.
///
/// Cheap to clone; clones share state, so a test can keep one clone to
/// drive replies while the registry owns another as its capability.
#[derive(Clone)]
pub struct LocalOracle {
    state: Arc<Mutex<OracleState>>,
    verifying: VerifyingKey,
}

impl LocalOracle {
    /// Builds an oracle from a fixed signing seed. Deterministic; used by
    /// tests that need reproducible handles and request ids.
    pub fn new(seed: [u8; 32]) -> Self {
        let signing = SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        Self {
            state: Arc::new(Mutex::new(OracleState {
                signing,
                plaintexts: HashMap::new(),
                jobs: VecDeque::new(),
                next_handle: 0,
                next_request: 0,
            })),
            verifying,
        }
    }

    /// Builds an oracle with a fresh OS-random signing key.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .expect("OS entropy unavailable");
        Self::new(seed)
    }

    /// The key replies are verified against.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.verifying
    }

    /// Registers a plaintext under a freshly derived opaque handle,
    /// simulating encryption performed outside the registry.
    pub fn bind_value(&self, plaintext: u64) -> CiphertextHandle {
        let mut state = self.lock();
        let mut hasher = blake3::Hasher::new();
        hasher.update(HANDLE_DOMAIN);
        hasher.update(self.verifying.as_bytes());
        hasher.update(&state.next_handle.to_le_bytes());
        let handle = CiphertextHandle(*hasher.finalize().as_bytes());
        state.next_handle += 1;
        state.plaintexts.insert(handle, plaintext);
        handle
    }

    /// Number of submitted jobs not yet taken by a driver.
    pub fn pending_jobs(&self) -> usize {
        self.lock().jobs.len()
    }

    /// Pops the oldest queued job, if any.
    pub fn take_job(&self) -> Option<DecryptionJob> {
        self.lock().jobs.pop_front()
    }

    /// Decrypts a job's handles and signs the reply.
    ///
    /// Fails if any handle was never bound; the fixed-width payload lays
    /// out one little-endian u64 per handle, in job order.
    pub fn answer(&self, job: &DecryptionJob) -> Result<OracleReply, OracleError> {
        let state = self.lock();
        let mut cleartexts = Vec::with_capacity(job.handles.len() * 8);
        for handle in &job.handles {
            let value = state
                .plaintexts
                .get(handle)
                .ok_or(OracleError::UnknownHandle { handle: *handle })?;
            cleartexts.extend_from_slice(&value.to_le_bytes());
        }

        let digest = proof_digest(&job.request_id, &cleartexts);
        let signature = state.signing.sign(&digest);

        Ok(OracleReply {
            request_id: job.request_id,
            cleartexts,
            proof: OracleProof(signature.to_bytes().to_vec()),
        })
    }

    /// Signs an arbitrary payload for a request id.
    ///
    /// Produces an authentic proof over whatever bytes are given, which
    /// lets a driver simulate a signed-but-malformed reply.
    pub fn sign_reply(&self, request_id: &RequestId, cleartexts: &[u8]) -> OracleProof {
        let digest = proof_digest(request_id, cleartexts);
        let signature = self.lock().signing.sign(&digest);
        OracleProof(signature.to_bytes().to_vec())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OracleState> {
        self.state.lock().expect("oracle state poisoned")
    }
}

impl EncryptionCapability for LocalOracle {
    fn is_bound(&self, handle: &CiphertextHandle) -> bool {
        self.lock().plaintexts.contains_key(handle)
    }

    fn submit_decryption_job(&self, handles: &[CiphertextHandle]) -> RequestId {
        let mut state = self.lock();
        let mut hasher = blake3::Hasher::new();
        hasher.update(REQUEST_DOMAIN);
        hasher.update(self.verifying.as_bytes());
        hasher.update(&state.next_request.to_le_bytes());
        for handle in handles {
            hasher.update(handle.as_bytes());
        }
        let request_id = RequestId(*hasher.finalize().as_bytes());
        state.next_request += 1;
        state.jobs.push_back(DecryptionJob {
            request_id,
            handles: handles.to_vec(),
        });
        request_id
    }

    fn verify_proof(
        &self,
        request_id: &RequestId,
        cleartexts: &[u8],
        proof: &OracleProof,
    ) -> bool {
        verify_reply_signature(&self.verifying, request_id, cleartexts, proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_then_is_bound() {
        let oracle = LocalOracle::new([7; 32]);
        let handle = oracle.bind_value(42);

        assert!(oracle.is_bound(&handle));
        assert!(!oracle.is_bound(&CiphertextHandle([0; 32])));
    }

    #[test]
    fn submitted_job_preserves_handle_order() {
        let oracle = LocalOracle::new([7; 32]);
        let handles: Vec<_> = (0..4).map(|v| oracle.bind_value(v)).collect();

        let request_id = oracle.submit_decryption_job(&handles);
        let job = oracle.take_job().expect("job queued");

        assert_eq!(job.request_id, request_id);
        assert_eq!(job.handles, handles);
        assert_eq!(oracle.pending_jobs(), 0);
    }

    #[test]
    fn answered_reply_verifies() {
        let oracle = LocalOracle::new([7; 32]);
        let handles = vec![oracle.bind_value(100), oracle.bind_value(250)];

        oracle.submit_decryption_job(&handles);
        let job = oracle.take_job().expect("job queued");
        let reply = oracle.answer(&job).expect("both handles bound");

        assert_eq!(reply.cleartexts.len(), 16);
        assert!(oracle.verify_proof(&reply.request_id, &reply.cleartexts, &reply.proof));
    }

    #[test]
    fn answer_fails_for_unknown_handle() {
        let oracle = LocalOracle::new([7; 32]);
        let job = DecryptionJob {
            request_id: RequestId([9; 32]),
            handles: vec![CiphertextHandle([1; 32])],
        };

        assert!(matches!(
            oracle.answer(&job),
            Err(OracleError::UnknownHandle { .. })
        ));
    }

    #[test]
    fn request_ids_are_distinct_per_submission() {
        let oracle = LocalOracle::new([7; 32]);
        let handles = vec![oracle.bind_value(1)];

        let r1 = oracle.submit_decryption_job(&handles);
        let r2 = oracle.submit_decryption_job(&handles);

        assert_ne!(r1, r2, "identical jobs must still get unique request ids");
    }
}
