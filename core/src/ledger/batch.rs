use serde::{Deserialize, Serialize};

use opaline_record::{CiphertextHandle, EncryptedRecord};

/// The lifecycle state of a batch. One-way: Open --close--> Closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Accepting record appends.
    Open,
    /// Sealed; record sequence is immutable forever.
    Closed,
}

/// A numbered, append-only collection of encrypted records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch id (monotonically increasing, starting at 1).
    pub id: u64,
    /// Current lifecycle state.
    pub status: BatchStatus,
    records: Vec<EncryptedRecord>,
}

impl Batch {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            status: BatchStatus::Open,
            records: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == BatchStatus::Open
    }

    /// Records in insertion order; index equals position.
    pub fn records(&self) -> &[EncryptedRecord] {
        &self.records
    }

    pub fn record_count(&self) -> u64 {
        self.records.len() as u64
    }

    /// The valuation handle of every record, in index order. This is the
    /// exact list a decryption request commits to.
    pub fn valuation_handles(&self) -> Vec<CiphertextHandle> {
        self.records.iter().map(|r| r.valuation).collect()
    }

    /// Appends a record and returns its index. Lifecycle checks are the
    /// store's responsibility.
    pub(crate) fn push_record(&mut self, record: EncryptedRecord) -> u64 {
        let index = self.records.len() as u64;
        self.records.push(record);
        index
    }

    pub(crate) fn close(&mut self) {
        self.status = BatchStatus::Closed;
    }
}
