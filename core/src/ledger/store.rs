//! Ledger Store
//!
//! Owns every batch and enforces the batch lifecycle: ids are allocated
//! monotonically from 1, records append only to the currently open batch
//! (the most recently allocated one, while it is Open), and a Closed
//! batch's record sequence never changes again.

use log::debug;

use opaline_record::{CiphertextHandle, EncryptedRecord};

use crate::error::RegistryError;
use crate::ledger::batch::{Batch, BatchStatus};

/// In-memory batch ledger. Exclusively owned by the registry; all
/// mutation goes through the operations below.
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Batch with id N lives at index N-1.
    batches: Vec<Batch>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next batch id and opens it. Prior batches' state is
    /// not a precondition; an older batch left Open simply stops accepting
    /// appends once a newer one exists.
    pub fn open_batch(&mut self) -> u64 {
        let id = self.batches.len() as u64 + 1;
        self.batches.push(Batch::new(id));
        debug!("batch {id} opened");
        id
    }

    /// Seals a batch. Fails for id 0, ids never allocated, and batches
    /// already Closed.
    pub fn close_batch(&mut self, id: u64) -> Result<(), RegistryError> {
        if id == 0 || id > self.batches.len() as u64 {
            return Err(RegistryError::InvalidBatchState { id });
        }
        let batch = &mut self.batches[(id - 1) as usize];

        if !batch.is_open() {
            return Err(RegistryError::InvalidBatchState { id });
        }

        batch.close();
        debug!("batch {id} closed");
        Ok(())
    }

    /// Appends a record to the currently open batch and returns its index.
    pub fn append_record(
        &mut self,
        id: u64,
        record: EncryptedRecord,
    ) -> Result<u64, RegistryError> {
        self.ensure_appendable(id)?;
        let batch = &mut self.batches[(id - 1) as usize];
        Ok(batch.push_record(record))
    }

    /// Checks that `id` is the currently open batch without mutating.
    /// Used by callers that must validate further preconditions between
    /// this check and the append itself.
    pub fn ensure_appendable(&self, id: u64) -> Result<(), RegistryError> {
        let current = self.batches.len() as u64;
        if id == 0 || id != current {
            return Err(RegistryError::InvalidBatchState { id });
        }
        if !self.batches[(id - 1) as usize].is_open() {
            return Err(RegistryError::InvalidBatchState { id });
        }
        Ok(())
    }

    pub fn batch(&self, id: u64) -> Option<&Batch> {
        if id == 0 {
            return None;
        }
        self.batches.get((id - 1) as usize)
    }

    /// Highest allocated batch id (0 when no batch was ever opened).
    pub fn highest_batch_id(&self) -> u64 {
        self.batches.len() as u64
    }

    /// The ordered valuation handles of a Closed batch. This is the read
    /// the decryption protocol commits to; it fails `InvalidBatchState`
    /// for unknown or still-Open batches.
    pub fn closed_valuation_handles(
        &self,
        id: u64,
    ) -> Result<Vec<CiphertextHandle>, RegistryError> {
        let batch = self
            .batch(id)
            .ok_or(RegistryError::InvalidBatchState { id })?;
        if batch.status != BatchStatus::Closed {
            return Err(RegistryError::InvalidBatchState { id });
        }
        Ok(batch.valuation_handles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaline_record::CiphertextHandle;

    fn record(seed: u8) -> EncryptedRecord {
        let handle = |offset: u8| CiphertextHandle([seed.wrapping_add(offset); 32]);
        EncryptedRecord::new(handle(0), handle(1), handle(2), handle(3), handle(4))
    }

    #[test]
    fn batch_ids_start_at_one_and_increase() {
        let mut store = LedgerStore::new();
        assert_eq!(store.open_batch(), 1);
        assert_eq!(store.open_batch(), 2);
        assert_eq!(store.highest_batch_id(), 2);
    }

    #[test]
    fn append_indices_are_dense_and_ordered() {
        let mut store = LedgerStore::new();
        let id = store.open_batch();

        for expected in 0..5 {
            let index = store.append_record(id, record(expected as u8)).unwrap();
            assert_eq!(index, expected);
        }
        assert_eq!(store.batch(id).unwrap().record_count(), 5);
    }

    #[test]
    fn append_fails_after_close() {
        let mut store = LedgerStore::new();
        let id = store.open_batch();
        store.append_record(id, record(1)).unwrap();
        store.close_batch(id).unwrap();

        assert_eq!(
            store.append_record(id, record(2)),
            Err(RegistryError::InvalidBatchState { id })
        );
        assert_eq!(store.batch(id).unwrap().record_count(), 1);
    }

    #[test]
    fn append_targets_only_the_latest_batch() {
        let mut store = LedgerStore::new();
        let first = store.open_batch();
        let second = store.open_batch();

        // First batch is still Open but no longer current
        assert_eq!(
            store.append_record(first, record(1)),
            Err(RegistryError::InvalidBatchState { id: first })
        );
        assert!(store.append_record(second, record(1)).is_ok());

        // It can still be closed, exactly once
        assert!(store.close_batch(first).is_ok());
        assert_eq!(
            store.close_batch(first),
            Err(RegistryError::InvalidBatchState { id: first })
        );
    }

    #[test]
    fn close_rejects_zero_and_unallocated_ids() {
        let mut store = LedgerStore::new();
        store.open_batch();

        assert_eq!(
            store.close_batch(0),
            Err(RegistryError::InvalidBatchState { id: 0 })
        );
        assert_eq!(
            store.close_batch(2),
            Err(RegistryError::InvalidBatchState { id: 2 })
        );
    }

    #[test]
    fn closed_valuation_handles_require_closed_batch() {
        let mut store = LedgerStore::new();
        let id = store.open_batch();
        store.append_record(id, record(1)).unwrap();

        assert!(store.closed_valuation_handles(id).is_err());
        assert!(store.closed_valuation_handles(99).is_err());

        store.close_batch(id).unwrap();
        let handles = store.closed_valuation_handles(id).unwrap();
        assert_eq!(handles, vec![CiphertextHandle([5; 32])]);
    }
}
