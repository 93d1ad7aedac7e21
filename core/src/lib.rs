//! Opaline Core
//!
//! A registry of confidential record batches with oracle-assisted
//! aggregation. Sensitive fields exist only as opaque ciphertext handles;
//! summing one field requires a round trip through an external,
//! asynchronous decryption oracle.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Decryption Protocol                          │
//! │                                                                  │
//! │  submit ──▶ append ──▶ close ──▶ request ─────────┐              │
//! │            (Open batch)         (Closed batch)    │              │
//! │                                                   ▼              │
//! │                               commitment captured, job handed    │
//! │                               to the oracle, context Pending     │
//! │                                                   │              │
//! │            ...unbounded, unordered delay...       │              │
//! │                                                   ▼              │
//! │  callback: lookup ▶ replay guard ▶ commitment recheck ▶ proof    │
//! │            verification ▶ decode & sum ▶ context Completed       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state is exclusively owned and mutated under a single-writer
//! discipline; [`service::RegistryService`] provides that discipline as a
//! tokio task processing one command at a time.

pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod protocol;
pub mod registry;
pub mod service;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use ledger::{Batch, BatchStatus, LedgerStore};
pub use protocol::{DecryptionContext, DecryptionCoordinator, DecryptionOutcome, RequestState};
pub use registry::ConfidentialRegistry;
pub use service::{RegistryCommand, RegistryService};
