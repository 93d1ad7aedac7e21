//! Opaline Oracle Capability
//!
//! The registry hands ciphertext handles to an external, asynchronous
//! decryption oracle and later accepts its reply. This crate defines the
//! seam between the two:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Decryption Round Trip                      │
//! │                                                                 │
//! │  Registry                         Oracle (untrusted, async)     │
//! │  ┌────────────────────┐          ┌──────────────────────────┐   │
//! │  │ submit_decryption_ │──job────▶│ decrypts off-process,    │   │
//! │  │ job(handles)       │          │ at an arbitrary later    │   │
//! │  │        ...         │◀─reply───│ time, possibly twice     │   │
//! │  │ verify_proof(...)  │          └──────────────────────────┘   │
//! │  └────────────────────┘                                         │
//! │                                                                 │
//! │  A reply carries (request_id, cleartexts, proof); the proof is  │
//! │  an Ed25519 signature over a domain-tagged digest of the other  │
//! │  two, so a reply cannot be forged or spliced across requests.   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`LocalOracle`] is a deterministic in-process implementation used by
//! tests, demos, and single-node deployments. It queues submitted jobs and
//! answers them only when the driver asks, which makes delayed, duplicated,
//! and tampered replies trivial to simulate.

pub mod capability;
pub mod local;
pub mod proof;

pub use capability::EncryptionCapability;
pub use local::{DecryptionJob, LocalOracle, OracleError};
pub use proof::{OracleProof, OracleReply, RequestId, proof_digest, verify_reply_signature};
