use thiserror::Error;

use opaline_oracle::RequestId;
use opaline_record::CiphertextHandle;

/// Registry errors.
///
/// Every variant is terminal for the specific call and leaves no partial
/// state behind; a caller may issue a new, corrected call. Authorization,
/// pause, and cooldown failures are enforced upstream and never reach this
/// taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("batch {id} is not in a valid state for this operation")]
    InvalidBatchState { id: u64 },

    #[error("ciphertext handle {handle} is not bound to this registry")]
    UnboundHandle { handle: CiphertextHandle },

    #[error("no decryption context for request {request_id}")]
    UnknownRequest { request_id: RequestId },

    #[error("decryption result for request {request_id} was already finalized")]
    ReplayDetected { request_id: RequestId },

    #[error("ledger state no longer matches the commitment of request {request_id}")]
    StateMismatch { request_id: RequestId },

    #[error("oracle proof rejected for request {request_id}")]
    InvalidProof { request_id: RequestId },

    #[error("malformed cleartext payload: {reason}")]
    MalformedPayload { reason: String },
}
