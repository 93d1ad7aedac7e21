//! The request/commit/callback decryption protocol.
//!
//! Phase 1 (request) runs synchronously: read the Closed batch's valuation
//! handles, commit to them, hand the job to the oracle, persist a Pending
//! context. Phase 2 (callback) arrives from the oracle at an arbitrary
//! later time and is validated against the stored context and the ledger's
//! current state before anything is trusted.

pub mod callback;
pub mod context;
pub mod coordinator;

pub use callback::DecryptionOutcome;
pub use context::{DecryptionContext, RequestState};
pub use coordinator::DecryptionCoordinator;
