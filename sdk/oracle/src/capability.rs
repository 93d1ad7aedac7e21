use opaline_record::CiphertextHandle;

use crate::proof::{OracleProof, RequestId};

/// The external encryption subsystem as seen by the registry.
///
/// The registry treats all three operations as opaque and correctly
/// implemented; the protocol's replay, commitment, and proof checks defend
/// against replies arriving late, twice, or forged, not against a broken
/// capability.
pub trait EncryptionCapability: Send + Sync {
    /// Whether a handle is validly associated with this registry instance.
    fn is_bound(&self, handle: &CiphertextHandle) -> bool;

    /// Hands an ordered handle list to the oracle for asynchronous
    /// decryption. Returns the oracle-assigned request identifier; the
    /// oracle guarantees its global uniqueness.
    fn submit_decryption_job(&self, handles: &[CiphertextHandle]) -> RequestId;

    /// Checks the authenticity of a reply for `request_id`.
    fn verify_proof(
        &self,
        request_id: &RequestId,
        cleartexts: &[u8],
        proof: &OracleProof,
    ) -> bool;
}
