//! Async Registry Service
//!
//! Wraps [`ConfidentialRegistry`] in a tokio task that owns all state and
//! processes one command at a time. That queue is the serialization
//! discipline the protocol assumes: every operation runs to completion
//! atomically with respect to all others, with no observable interleaving.
//! The only asynchronous boundary is at the edges, where a job is handed
//! to the oracle and where its reply is later accepted.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};

use opaline_oracle::{EncryptionCapability, OracleProof, RequestId};
use opaline_record::{EncryptedRecord, PartyId};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::ConfidentialRegistry;

/// Messages for the registry service
pub enum RegistryCommand {
    OpenBatch(oneshot::Sender<u64>),
    CloseBatch(u64, oneshot::Sender<Result<(), RegistryError>>),
    AppendRecord(
        PartyId,
        u64,
        EncryptedRecord,
        oneshot::Sender<Result<u64, RegistryError>>,
    ),
    RequestDecryption(u64, oneshot::Sender<Result<RequestId, RegistryError>>),
    DecryptionResult(
        RequestId,
        Vec<u8>,
        OracleProof,
        oneshot::Sender<Result<u128, RegistryError>>,
    ),
    Events(oneshot::Sender<Vec<RegistryEvent>>),
    Shutdown,
}

/// Async handle to a registry owned by a single service task.
#[derive(Clone)]
pub struct RegistryService {
    command_tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryService {
    /// Starts the service task and returns its handle.
    pub fn start(config: RegistryConfig, oracle: Arc<dyn EncryptionCapability>) -> Self {
        let (command_tx, mut command_rx) = mpsc::channel::<RegistryCommand>(config.command_buffer);
        let mut registry = ConfidentialRegistry::new(config.instance(), oracle);

        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                match cmd {
                    RegistryCommand::OpenBatch(reply) => {
                        let _ = reply.send(registry.open_batch());
                    }
                    RegistryCommand::CloseBatch(batch_id, reply) => {
                        let _ = reply.send(registry.close_batch(batch_id));
                    }
                    RegistryCommand::AppendRecord(submitter, batch_id, record, reply) => {
                        let _ = reply.send(registry.append_record(submitter, batch_id, record));
                    }
                    RegistryCommand::RequestDecryption(batch_id, reply) => {
                        let _ = reply.send(registry.request_batch_decryption(batch_id));
                    }
                    RegistryCommand::DecryptionResult(request_id, cleartexts, proof, reply) => {
                        let _ = reply.send(registry.on_decryption_result(
                            request_id,
                            &cleartexts,
                            &proof,
                        ));
                    }
                    RegistryCommand::Events(reply) => {
                        let _ = reply.send(registry.events().to_vec());
                    }
                    RegistryCommand::Shutdown => {
                        break;
                    }
                }
            }
        });

        Self { command_tx }
    }

    pub async fn open_batch(&self) -> Result<u64> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::OpenBatch(reply_tx))
            .await
            .context("registry service unavailable")?;
        reply_rx.await.context("registry service crashed")
    }

    pub async fn close_batch(&self, batch_id: u64) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::CloseBatch(batch_id, reply_tx))
            .await
            .context("registry service unavailable")?;
        Ok(reply_rx.await.context("registry service crashed")??)
    }

    pub async fn append_record(
        &self,
        submitter: PartyId,
        batch_id: u64,
        record: EncryptedRecord,
    ) -> Result<u64> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::AppendRecord(
                submitter, batch_id, record, reply_tx,
            ))
            .await
            .context("registry service unavailable")?;
        Ok(reply_rx.await.context("registry service crashed")??)
    }

    pub async fn request_batch_decryption(&self, batch_id: u64) -> Result<RequestId> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::RequestDecryption(batch_id, reply_tx))
            .await
            .context("registry service unavailable")?;
        Ok(reply_rx.await.context("registry service crashed")??)
    }

    pub async fn submit_decryption_result(
        &self,
        request_id: RequestId,
        cleartexts: Vec<u8>,
        proof: OracleProof,
    ) -> Result<u128> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::DecryptionResult(
                request_id, cleartexts, proof, reply_tx,
            ))
            .await
            .context("registry service unavailable")?;
        Ok(reply_rx.await.context("registry service crashed")??)
    }

    /// Snapshot of the observation stream.
    pub async fn events(&self) -> Result<Vec<RegistryEvent>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RegistryCommand::Events(reply_tx))
            .await
            .context("registry service unavailable")?;
        reply_rx.await.context("registry service crashed")
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(RegistryCommand::Shutdown)
            .await
            .context("registry service unavailable")?;
        Ok(())
    }
}
