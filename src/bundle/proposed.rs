// Proposed transfers
// This file defines not-yet-attached transactions and the bundle that
// collects them before signing, PoW and broadcast
//
// Numan Thabit 2025 Nov

use crate::bundle::validation::validate_transaction;
use crate::errors::ClientResult;
use crate::transaction::{UnsignedSlot, FRAGMENT_LEN};
use crate::trytes::{Address, Hash, TryteString};
use std::time::{SystemTime, UNIX_EPOCH};

/// An output transaction that has not been attached to the ledger yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedTransaction {
    pub address: Address,
    pub value: i64,
    pub tag: Option<TryteString>,
    pub message: Option<TryteString>,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl ProposedTransaction {
    pub fn new(address: Address, value: i64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            address,
            value,
            tag: None,
            message: None,
            timestamp,
        }
    }

    pub fn with_tag(mut self, tag: TryteString) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_message(mut self, message: TryteString) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Number of transaction slots this entry occupies once serialised; a
    /// message longer than one fragment spills into extra zero-value slots.
    pub fn slot_count(&self) -> usize {
        match &self.message {
            Some(m) if !m.is_empty() => m.len().div_ceil(FRAGMENT_LEN),
            _ => 1,
        }
    }
}

/// Lifecycle of a transfer. Every transition after `Proposed` is performed by
/// a collaborator reached through the routing client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Proposed,
    Signed,
    Attached,
    Broadcast,
    Stored,
}

/// Ordered output transactions awaiting signing and attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedBundle {
    transactions: Vec<ProposedTransaction>,
}

impl ProposedBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tx` after validating its fields. A rejected transaction leaves
    /// the bundle unchanged.
    pub fn add_transaction(&mut self, tx: ProposedTransaction) -> ClientResult<()> {
        validate_transaction(&tx).into_result()?;
        self.transactions.push(tx);
        Ok(())
    }

    pub fn transactions(&self) -> &[ProposedTransaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProposedTransaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of output values. Balancing against inputs is the signer's job.
    pub fn balance(&self) -> i64 {
        self.transactions.iter().map(|t| t.value).sum()
    }

    /// Serialises the bundle, tail first, with `bundle_hash` in every slot.
    /// Signature fragments carry the messages; a signer replaces the
    /// fragments of any input slots it appends.
    pub fn unsigned_trytes(&self, bundle_hash: &Hash) -> Vec<TryteString> {
        let total: usize = self.transactions.iter().map(|t| t.slot_count()).sum();
        let last_index = total.saturating_sub(1) as u64;
        let empty_tag = TryteString::default();
        let mut out = Vec::with_capacity(total);

        for tx in &self.transactions {
            let tag = tx.tag.as_ref().unwrap_or(&empty_tag);
            let fragments: Vec<TryteString> = match &tx.message {
                Some(m) if !m.is_empty() => m.chunks(FRAGMENT_LEN).collect(),
                _ => vec![TryteString::default()],
            };
            for (i, fragment) in fragments.into_iter().enumerate() {
                let slot = UnsignedSlot {
                    fragment,
                    address: tx.address.hash(),
                    value: if i == 0 { tx.value } else { 0 },
                    tag,
                    timestamp: tx.timestamp,
                    current_index: out.len() as u64,
                    last_index,
                };
                out.push(slot.encode(bundle_hash));
            }
        }
        out
    }
}
