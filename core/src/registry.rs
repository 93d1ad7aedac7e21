//! Confidential Registry
//!
//! The owner struct tying the pieces together: the ledger, the decryption
//! protocol, the observation stream, and the handle to the external
//! encryption capability. Access policy (roles, pause flag, submission
//! cooldown) is enforced upstream; every operation here assumes those
//! checks already passed.

use std::sync::Arc;

use log::{debug, info};

use opaline_commitment::InstanceId;
use opaline_oracle::{EncryptionCapability, OracleProof, RequestId};
use opaline_record::{EncryptedRecord, PartyId};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::ledger::{Batch, LedgerStore};
use crate::protocol::{DecryptionContext, DecryptionCoordinator};

pub struct ConfidentialRegistry {
    instance: InstanceId,
    oracle: Arc<dyn EncryptionCapability>,
    ledger: LedgerStore,
    coordinator: DecryptionCoordinator,
    events: Vec<RegistryEvent>,
}

impl ConfidentialRegistry {
    pub fn new(instance: InstanceId, oracle: Arc<dyn EncryptionCapability>) -> Self {
        Self {
            instance,
            oracle,
            ledger: LedgerStore::new(),
            coordinator: DecryptionCoordinator::new(),
            events: Vec::new(),
        }
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    /// Opens the next batch and returns its id.
    pub fn open_batch(&mut self) -> u64 {
        let batch_id = self.ledger.open_batch();
        info!("batch {batch_id} opened");
        self.events.push(RegistryEvent::BatchOpened { batch_id });
        batch_id
    }

    /// Seals a batch; its record sequence is immutable from here on.
    pub fn close_batch(&mut self, batch_id: u64) -> Result<(), RegistryError> {
        self.ledger.close_batch(batch_id)?;
        info!("batch {batch_id} closed");
        self.events.push(RegistryEvent::BatchClosed { batch_id });
        Ok(())
    }

    /// Appends a record to the currently open batch.
    ///
    /// All five handles must be bound to this registry instance; the check
    /// runs after the lifecycle precondition and before any mutation, so a
    /// rejected append stores nothing.
    pub fn append_record(
        &mut self,
        submitter: PartyId,
        batch_id: u64,
        record: EncryptedRecord,
    ) -> Result<u64, RegistryError> {
        self.ledger.ensure_appendable(batch_id)?;
        for handle in record.handles() {
            if !self.oracle.is_bound(&handle) {
                return Err(RegistryError::UnboundHandle { handle });
            }
        }

        let index = self.ledger.append_record(batch_id, record)?;
        debug!(
            "record appended: batch={batch_id} index={index} submitter={}",
            hex::encode(submitter.0)
        );
        self.events.push(RegistryEvent::RecordAppended {
            submitter,
            batch_id,
            index,
        });
        Ok(index)
    }

    /// Requests oracle decryption of a Closed batch's valuation column.
    pub fn request_batch_decryption(&mut self, batch_id: u64) -> Result<RequestId, RegistryError> {
        let request_id =
            self.coordinator
                .request(&self.ledger, self.oracle.as_ref(), &self.instance, batch_id)?;
        self.events.push(RegistryEvent::DecryptionRequested {
            request_id,
            batch_id,
        });
        Ok(request_id)
    }

    /// Accepts an oracle reply and, if it passes every protocol check,
    /// finalizes the batch's aggregate valuation.
    pub fn on_decryption_result(
        &mut self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &OracleProof,
    ) -> Result<u128, RegistryError> {
        let outcome = self.coordinator.on_result(
            &self.ledger,
            self.oracle.as_ref(),
            &self.instance,
            request_id,
            cleartexts,
            proof,
        )?;
        self.events.push(RegistryEvent::DecryptionCompleted {
            request_id,
            batch_id: outcome.batch_id,
            aggregate_total: outcome.aggregate_total,
        });
        Ok(outcome.aggregate_total)
    }

    pub fn batch(&self, batch_id: u64) -> Option<&Batch> {
        self.ledger.batch(batch_id)
    }

    pub fn context(&self, request_id: &RequestId) -> Option<&DecryptionContext> {
        self.coordinator.context(request_id)
    }

    /// The observation stream, in operation order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaline_oracle::LocalOracle;
    use opaline_record::CiphertextHandle;

    fn registry_with_oracle() -> (ConfidentialRegistry, LocalOracle) {
        let oracle = LocalOracle::new([9; 32]);
        let registry = ConfidentialRegistry::new(
            InstanceId::from_label("test-registry"),
            Arc::new(oracle.clone()),
        );
        (registry, oracle)
    }

    fn bound_record(oracle: &LocalOracle, valuation: u64) -> EncryptedRecord {
        EncryptedRecord::new(
            oracle.bind_value(1),
            oracle.bind_value(2),
            oracle.bind_value(3),
            oracle.bind_value(4),
            oracle.bind_value(valuation),
        )
    }

    #[test]
    fn unbound_handle_rejected_before_any_mutation() {
        let (mut registry, oracle) = registry_with_oracle();
        let batch_id = registry.open_batch();

        let mut record = bound_record(&oracle, 10);
        record.valuation = CiphertextHandle([0xff; 32]);

        assert_eq!(
            registry.append_record(PartyId([1; 32]), batch_id, record),
            Err(RegistryError::UnboundHandle {
                handle: CiphertextHandle([0xff; 32])
            })
        );
        assert_eq!(registry.batch(batch_id).unwrap().record_count(), 0);
        // Only the open event exists; the rejected append left no trace
        assert_eq!(registry.events().len(), 1);
    }

    #[test]
    fn lifecycle_emits_events_in_operation_order() {
        let (mut registry, oracle) = registry_with_oracle();
        let submitter = PartyId([7; 32]);

        let batch_id = registry.open_batch();
        for valuation in [100, 250, 75] {
            registry
                .append_record(submitter, batch_id, bound_record(&oracle, valuation))
                .unwrap();
        }
        registry.close_batch(batch_id).unwrap();

        let request_id = registry.request_batch_decryption(batch_id).unwrap();
        let reply = oracle.answer(&oracle.take_job().unwrap()).unwrap();
        let total = registry
            .on_decryption_result(request_id, &reply.cleartexts, &reply.proof)
            .unwrap();
        assert_eq!(total, 425);

        let events = registry.events();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0], RegistryEvent::BatchOpened { batch_id });
        assert_eq!(
            events[1],
            RegistryEvent::RecordAppended {
                submitter,
                batch_id,
                index: 0
            }
        );
        assert_eq!(events[4], RegistryEvent::BatchClosed { batch_id });
        assert_eq!(
            events[5],
            RegistryEvent::DecryptionRequested {
                request_id,
                batch_id
            }
        );
        assert_eq!(
            events[6],
            RegistryEvent::DecryptionCompleted {
                request_id,
                batch_id,
                aggregate_total: 425
            }
        );
    }

    #[test]
    fn completion_event_is_emitted_exactly_once_under_replay() {
        let (mut registry, oracle) = registry_with_oracle();
        let batch_id = registry.open_batch();
        registry
            .append_record(PartyId([7; 32]), batch_id, bound_record(&oracle, 42))
            .unwrap();
        registry.close_batch(batch_id).unwrap();

        let request_id = registry.request_batch_decryption(batch_id).unwrap();
        let reply = oracle.answer(&oracle.take_job().unwrap()).unwrap();

        registry
            .on_decryption_result(request_id, &reply.cleartexts, &reply.proof)
            .unwrap();
        assert_eq!(
            registry.on_decryption_result(request_id, &reply.cleartexts, &reply.proof),
            Err(RegistryError::ReplayDetected { request_id })
        );

        let completions = registry
            .events()
            .iter()
            .filter(|e| matches!(e, RegistryEvent::DecryptionCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn decryption_request_needs_an_existing_closed_batch() {
        let (mut registry, _oracle) = registry_with_oracle();

        assert_eq!(
            registry.request_batch_decryption(2),
            Err(RegistryError::InvalidBatchState { id: 2 })
        );

        let batch_id = registry.open_batch();
        assert_eq!(
            registry.request_batch_decryption(batch_id),
            Err(RegistryError::InvalidBatchState { id: batch_id })
        );
    }
}
