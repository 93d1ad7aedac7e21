//! Opaline Record Types
//!
//! Shared types for confidential records: opaque ciphertext handles,
//! submitter identities, and the five-field encrypted record stored in
//! ledger batches. The registry never dereferences a handle to plaintext;
//! handles are references into an external encryption subsystem.

pub mod handle;
pub mod record;

pub use handle::{CiphertextHandle, PartyId};
pub use record::EncryptedRecord;
