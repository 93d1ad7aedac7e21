pub mod batch;
pub mod store;

pub use batch::{Batch, BatchStatus};
pub use store::LedgerStore;
