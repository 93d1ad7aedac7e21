//! Oracle Callback Handler
//!
//! Accepts the oracle's asynchronous reply. The reply is untrusted: it may
//! arrive twice, for a request this registry never made, with a forged
//! proof, or for data that drifted since request time. Every check runs
//! before any state mutation, so a rejected callback has no effect at all.

use log::{info, warn};

use opaline_commitment::{InstanceId, commit_handles};
use opaline_oracle::{EncryptionCapability, OracleProof, RequestId};

use crate::error::RegistryError;
use crate::ledger::LedgerStore;
use crate::protocol::context::RequestState;
use crate::protocol::coordinator::DecryptionCoordinator;

/// Width in bytes of one decrypted valuation in the reply payload.
const VALUE_WIDTH: usize = 8;

/// A finalized aggregate, produced at most once per request id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecryptionOutcome {
    pub batch_id: u64,
    pub aggregate_total: u128,
}

impl DecryptionCoordinator {
    /// Validates and finalizes an oracle reply.
    ///
    /// Ordered checks: context lookup, replay guard, commitment recheck
    /// against the ledger's current handles, proof verification, payload
    /// decode. Only then is the context marked Completed. A proof or
    /// payload rejection leaves the context Pending, so a corrected reply
    /// for the same request id can still succeed.
    pub fn on_result(
        &mut self,
        ledger: &LedgerStore,
        oracle: &dyn EncryptionCapability,
        instance: &InstanceId,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &OracleProof,
    ) -> Result<DecryptionOutcome, RegistryError> {
        let context = self
            .contexts
            .get(&request_id)
            .copied()
            .ok_or(RegistryError::UnknownRequest { request_id })?;

        if context.is_processed() {
            warn!("replayed decryption result dropped: request={request_id}");
            return Err(RegistryError::ReplayDetected { request_id });
        }

        let handles = ledger
            .closed_valuation_handles(context.batch_id)
            .map_err(|_| RegistryError::StateMismatch { request_id })?;
        let recomputed = commit_handles(&handles, instance);
        if recomputed != context.commitment {
            warn!(
                "commitment drift on request {request_id}: stored={} recomputed={recomputed}",
                context.commitment,
            );
            return Err(RegistryError::StateMismatch { request_id });
        }

        if !oracle.verify_proof(&request_id, cleartexts, proof) {
            return Err(RegistryError::InvalidProof { request_id });
        }

        let valuations = decode_valuations(cleartexts, handles.len())?;
        let aggregate_total: u128 = valuations.iter().map(|&v| u128::from(v)).sum();

        let entry = self
            .contexts
            .get_mut(&request_id)
            .ok_or(RegistryError::UnknownRequest { request_id })?;
        entry.state = RequestState::Completed;

        info!(
            "decryption completed: batch={} request={request_id} total={aggregate_total}",
            context.batch_id,
        );
        Ok(DecryptionOutcome {
            batch_id: context.batch_id,
            aggregate_total,
        })
    }
}

/// Decodes the reply payload: exactly one little-endian u64 per record,
/// in commitment (index) order.
fn decode_valuations(payload: &[u8], record_count: usize) -> Result<Vec<u64>, RegistryError> {
    let expected = record_count * VALUE_WIDTH;
    if payload.len() != expected {
        return Err(RegistryError::MalformedPayload {
            reason: format!(
                "expected {expected} bytes for {record_count} records, got {}",
                payload.len()
            ),
        });
    }
    Ok(payload
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().expect("chunk width is fixed")))
        .collect())
}
