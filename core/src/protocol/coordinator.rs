use std::collections::HashMap;

use log::debug;

use opaline_commitment::{InstanceId, commit_handles};
use opaline_oracle::{EncryptionCapability, RequestId};

use crate::error::RegistryError;
use crate::ledger::LedgerStore;
use crate::protocol::context::DecryptionContext;

/// Issues decryption requests and owns every request's context for the
/// lifetime of the registry. The callback path lives in
/// [`crate::protocol::callback`].
#[derive(Default)]
pub struct DecryptionCoordinator {
    pub(crate) contexts: HashMap<RequestId, DecryptionContext>,
}

impl DecryptionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self, request_id: &RequestId) -> Option<&DecryptionContext> {
        self.contexts.get(request_id)
    }

    /// Total requests ever issued, pending or completed.
    pub fn request_count(&self) -> usize {
        self.contexts.len()
    }

    /// Requests decryption of a Closed batch's valuation column.
    ///
    /// Captures a commitment over the exact ordered handle list handed to
    /// the oracle, so the eventual reply can be checked against the data
    /// as it existed now. A Closed batch is immutable, so re-requesting
    /// the same batch yields an identical commitment under a fresh request
    /// id; outstanding requests for one batch may coexist.
    pub fn request(
        &mut self,
        ledger: &LedgerStore,
        oracle: &dyn EncryptionCapability,
        instance: &InstanceId,
        batch_id: u64,
    ) -> Result<RequestId, RegistryError> {
        let handles = ledger.closed_valuation_handles(batch_id)?;
        let commitment = commit_handles(&handles, instance);
        let request_id = oracle.submit_decryption_job(&handles);

        let previous = self
            .contexts
            .insert(request_id, DecryptionContext::pending(batch_id, commitment));
        debug_assert!(previous.is_none(), "oracle reused a request id");

        debug!(
            "decryption requested: batch={} request={} handles={} commitment={}",
            batch_id,
            request_id,
            handles.len(),
            commitment,
        );
        Ok(request_id)
    }
}
