// Bundle module - proposed transfers, validation and reconstruction
// of attached bundles from fetched records
//
// Numan Thabit 2025 Nov

pub mod proposed;
pub mod reconstruct;
pub mod validation;

pub use proposed::{ProposedBundle, ProposedTransaction, TransferState};
pub use reconstruct::{assemble, select_tail};
pub use validation::{validate_transaction, ValidationResult};

use crate::transaction::TransactionFields;
use crate::trytes::{Hash, TryteString};

/// A bundle after attachment, as returned by the send and replay pipelines.
#[derive(Debug, Clone)]
pub struct AttachedBundle {
    /// Bundle hash read from the attached transactions
    pub hash: Hash,
    /// Attached transaction trytes, tail first
    pub trytes: Vec<TryteString>,
    pub transactions: Vec<TransactionFields>,
}

impl AttachedBundle {
    pub fn len(&self) -> usize {
        self.trytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trytes.is_empty()
    }
}
