use serde::{Deserialize, Serialize};

use opaline_commitment::StateCommitment;

/// Finalization state of a decryption request.
///
/// Together with map absence this forms the tri-state idempotency record:
/// absent / Pending / Completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Awaiting a valid oracle reply.
    Pending,
    /// A reply was accepted and finalized; any further reply is a replay.
    Completed,
}

/// Per-request protocol state, keyed by the oracle-assigned request id.
///
/// Created exactly once per request, mutated exactly once (Pending ->
/// Completed), never deleted: contexts double as the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionContext {
    /// The batch this request targets.
    pub batch_id: u64,
    /// Commitment over the exact ordered handle list at request time.
    pub commitment: StateCommitment,
    pub state: RequestState,
}

impl DecryptionContext {
    pub(crate) fn pending(batch_id: u64, commitment: StateCommitment) -> Self {
        Self {
            batch_id,
            commitment,
            state: RequestState::Pending,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.state == RequestState::Completed
    }
}
