use serde::{Deserialize, Serialize};

use opaline_oracle::RequestId;
use opaline_record::PartyId;

/// Observation stream entries.
///
/// The registry appends one event per successful state change, in
/// operation order. The stream is append-only and externally visible;
/// rejected calls emit nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    BatchOpened {
        batch_id: u64,
    },
    BatchClosed {
        batch_id: u64,
    },
    RecordAppended {
        submitter: PartyId,
        batch_id: u64,
        index: u64,
    },
    DecryptionRequested {
        request_id: RequestId,
        batch_id: u64,
    },
    DecryptionCompleted {
        request_id: RequestId,
        batch_id: u64,
        aggregate_total: u128,
    },
}
