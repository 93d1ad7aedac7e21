use serde::{Deserialize, Serialize};

use crate::handle::CiphertextHandle;

/// A confidential record as stored in a ledger batch.
///
/// Every sensitive field is an opaque ciphertext handle. The valuation
/// handle is the one field the decryption protocol aggregates over.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Owner identity.
    pub owner: CiphertextHandle,
    /// Property identifier.
    pub asset: CiphertextHandle,
    /// Number of transfers recorded against the property.
    pub transfer_count: CiphertextHandle,
    /// Timestamp of the most recent transfer.
    pub last_transfer_at: CiphertextHandle,
    /// Property valuation (the aggregated field).
    pub valuation: CiphertextHandle,
}

impl EncryptedRecord {
    pub fn new(
        owner: CiphertextHandle,
        asset: CiphertextHandle,
        transfer_count: CiphertextHandle,
        last_transfer_at: CiphertextHandle,
        valuation: CiphertextHandle,
    ) -> Self {
        Self {
            owner,
            asset,
            transfer_count,
            last_transfer_at,
            valuation,
        }
    }

    /// All five handles, in declaration order. Used for bind validation.
    pub fn handles(&self) -> [CiphertextHandle; 5] {
        [
            self.owner,
            self.asset,
            self.transfer_count,
            self.last_transfer_at,
            self.valuation,
        ]
    }
}
