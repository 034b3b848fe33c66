// Bundle reconstruction
// This file recovers a bundle's tail and its ordered transaction chain from an
// unordered set of fetched records
//
// Numan Thabit 2025 Nov

use crate::errors::{ClientError, ClientResult};
use crate::transaction::TransactionRecord;
use crate::trytes::Hash;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Picks the tail (index 0) of `bundle_hash` among `records`.
///
/// Records of other bundles are ignored. Several tails under one bundle hash
/// are reattachments of the same bundle: the one with the latest attachment
/// timestamp wins and ties go to the smallest hash, so the choice does not
/// depend on the order in which the node returned the records.
pub fn select_tail<'a>(
    records: &'a [TransactionRecord],
    bundle_hash: &Hash,
) -> ClientResult<&'a TransactionRecord> {
    let mut tails = records
        .iter()
        .filter(|r| &r.bundle_hash == bundle_hash && r.is_tail());

    let first = tails.next().ok_or_else(|| {
        ClientError::Reconstruction(format!(
            "no tail transaction found for bundle {bundle_hash}"
        ))
    })?;

    let mut candidates = 1usize;
    let best = tails.fold(first, |best, r| {
        candidates += 1;
        match r.attachment_timestamp.cmp(&best.attachment_timestamp) {
            Ordering::Greater => r,
            Ordering::Equal if r.hash < best.hash => r,
            _ => best,
        }
    });

    if candidates > 1 {
        debug!(
            bundle = %bundle_hash,
            candidates = candidates,
            tail = %best.hash,
            "multiple tails found; picked latest attachment"
        );
    }
    Ok(best)
}

/// Checks that `next` directly follows `prev` inside one bundle.
pub fn check_link(prev: &TransactionRecord, next: &TransactionRecord) -> ClientResult<()> {
    if next.bundle_hash != prev.bundle_hash {
        return Err(ClientError::Reconstruction(format!(
            "transaction {} at index {} belongs to bundle {}, expected {}",
            next.hash, next.current_index, next.bundle_hash, prev.bundle_hash
        )));
    }
    if next.current_index != prev.current_index + 1 {
        return Err(ClientError::Reconstruction(format!(
            "bundle {} index gap: {} follows {}",
            prev.bundle_hash, next.current_index, prev.current_index
        )));
    }
    if next.last_index != prev.last_index {
        return Err(ClientError::Reconstruction(format!(
            "bundle {} disagrees on last index: {} vs {}",
            prev.bundle_hash, next.last_index, prev.last_index
        )));
    }
    Ok(())
}

/// Recovers the full bundle ordered by index, starting from the selected tail
/// and following trunk references through `records`.
pub fn assemble(
    records: &[TransactionRecord],
    bundle_hash: &Hash,
) -> ClientResult<Vec<TransactionRecord>> {
    let tail = select_tail(records, bundle_hash)?;
    let by_hash: HashMap<&Hash, &TransactionRecord> =
        records.iter().map(|r| (&r.hash, r)).collect();

    let mut chain = vec![tail.clone()];
    let mut current = tail;
    while !current.is_head() {
        let next = by_hash.get(&current.trunk).copied().ok_or_else(|| {
            ClientError::Reconstruction(format!(
                "bundle {bundle_hash} chain broken after index {}: trunk {} not among fetched records",
                current.current_index, current.trunk
            ))
        })?;
        check_link(current, next)?;
        chain.push(next.clone());
        current = next;
    }
    Ok(chain)
}
