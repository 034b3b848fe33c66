// Execution pipeline - attaches, broadcasts and stores bundles
// This file implements the send and replay composites on top of the
// routed node commands, tagging failures with the stage that failed
//
// Numan Thabit 2025 Nov

use crate::bundle::{AttachedBundle, ProposedBundle, TransferState};
use crate::errors::{ClientError, ClientResult, SendStage};
use crate::router::router::RoutingClient;
use crate::signing::BundleSigner;
use crate::transaction::{decode_fields, TRANSACTION_LEN};
use crate::trytes::{Hash, TryteString};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Pipeline statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStats {
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub success_rate: f64,
}

#[derive(Debug, Default)]
pub(crate) struct PipelineCounters {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
}

impl PipelineCounters {
    fn snapshot(&self) -> ExecutionStats {
        let total = self.total.load(Ordering::Relaxed);
        let successful = self.successful.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        ExecutionStats {
            total_executions: total,
            successful_executions: successful,
            failed_executions: failed,
            success_rate: if total > 0 {
                successful as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

fn transition(bundle: &Hash, state: TransferState) {
    debug!(bundle = %bundle, state = ?state, "transfer state advanced");
}

impl RoutingClient {
    /// Get pipeline statistics
    pub fn get_stats(&self) -> ExecutionStats {
        self.counters.snapshot()
    }

    /// Signs `bundle` through `signer`, then attaches, broadcasts and stores
    /// it. The signer's own node lookups are routed through this client.
    /// Nothing is considered sent unless every stage succeeds.
    #[tracing::instrument(skip_all, fields(transactions = bundle.len(), depth = depth))]
    pub async fn send_transfer(
        &self,
        bundle: &ProposedBundle,
        signer: &dyn BundleSigner,
        depth: u32,
    ) -> ClientResult<AttachedBundle> {
        if bundle.is_empty() {
            return Err(ClientError::Validation("cannot send an empty bundle".into()));
        }
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        debug!(transactions = bundle.len(), state = ?TransferState::Proposed, "transfer proposed");

        let signed = signer
            .sign(self, bundle)
            .await
            .and_then(|trytes| {
                check_signed(&trytes)?;
                Ok(trytes)
            })
            .map_err(ClientError::at_stage(SendStage::Sign));
        let signed = match signed {
            Ok(trytes) => trytes,
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };
        debug!(transactions = signed.len(), state = ?TransferState::Signed, "bundle signed");

        self.run_pipeline(signed, depth).await
    }

    /// Attaches, broadcasts and stores already-signed transaction trytes,
    /// given tail first.
    pub async fn send_trytes(&self, trytes: Vec<TryteString>, depth: u32) -> ClientResult<AttachedBundle> {
        check_signed(&trytes)?;
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        self.run_pipeline(trytes, depth).await
    }

    /// Fetches the bundle that starts at `tail` and submits it again with
    /// fresh tips.
    #[tracing::instrument(skip_all, fields(tail = %tail, depth = depth))]
    pub async fn replay_bundle(&self, tail: &Hash, depth: u32) -> ClientResult<AttachedBundle> {
        let records = self.get_bundle(tail).await?;
        let trytes: Vec<TryteString> = records.into_iter().map(|r| r.trytes).collect();
        info!(transactions = trytes.len(), "replaying bundle");
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        self.run_pipeline(trytes, depth).await
    }

    /// Looks up the tail of `bundle_hash` and replays the bundle from it.
    pub async fn reattach(&self, bundle_hash: &Hash, depth: u32) -> ClientResult<AttachedBundle> {
        let tail = self.find_tail(bundle_hash).await?;
        self.replay_bundle(&tail, depth).await
    }

    async fn run_pipeline(&self, signed: Vec<TryteString>, depth: u32) -> ClientResult<AttachedBundle> {
        match self.attach_broadcast_store(signed, depth).await {
            Ok(attached) => {
                self.counters.successful.fetch_add(1, Ordering::Relaxed);
                info!(
                    bundle = %attached.hash,
                    transactions = attached.len(),
                    "bundle attached, broadcast and stored"
                );
                Ok(attached)
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(stage = ?e.stage(), error = %e, "send pipeline failed");
                Err(e)
            }
        }
    }

    async fn attach_broadcast_store(
        &self,
        signed: Vec<TryteString>,
        depth: u32,
    ) -> ClientResult<AttachedBundle> {
        let tips = self
            .get_transactions_to_approve(depth)
            .await
            .map_err(ClientError::at_stage(SendStage::Tips))?;

        // the PoW node chains transactions head first
        let head_first: Vec<TryteString> = signed.into_iter().rev().collect();
        let attached = match self
            .attach_to_tangle(&tips, self.min_weight_magnitude(), &head_first)
            .await
            .and_then(|trytes| decode_attached(trytes, head_first.len()))
        {
            Ok(attached) => attached,
            Err(e) => {
                if let Err(interrupt_err) = self.interrupt_attaching_to_tangle().await {
                    warn!(error = %interrupt_err, "interrupting PoW after failed attach also failed");
                }
                return Err(ClientError::at_stage(SendStage::Attach)(e));
            }
        };
        transition(&attached.hash, TransferState::Attached);

        self.broadcast_transactions(&attached.trytes)
            .await
            .map_err(ClientError::at_stage(SendStage::Broadcast))?;
        transition(&attached.hash, TransferState::Broadcast);

        self.store_transactions(&attached.trytes)
            .await
            .map_err(ClientError::at_stage(SendStage::Store))?;
        transition(&attached.hash, TransferState::Stored);

        Ok(attached)
    }
}

fn check_signed(trytes: &[TryteString]) -> ClientResult<()> {
    if trytes.is_empty() {
        return Err(ClientError::Validation("signer produced no transactions".into()));
    }
    if let Some(t) = trytes.iter().find(|t| t.len() != TRANSACTION_LEN) {
        return Err(ClientError::Validation(format!(
            "signed transaction is {} trytes, expected {TRANSACTION_LEN}",
            t.len()
        )));
    }
    Ok(())
}

/// Decodes PoW output into a bundle ordered tail first.
fn decode_attached(trytes: Vec<TryteString>, expected: usize) -> ClientResult<AttachedBundle> {
    if trytes.len() != expected {
        return Err(ClientError::Protocol(format!(
            "attachToTangle returned {} transactions for {expected}",
            trytes.len()
        )));
    }
    let mut decoded = trytes
        .into_iter()
        .map(|t| decode_fields(&t).map(|fields| (fields, t)))
        .collect::<ClientResult<Vec<_>>>()?;
    decoded.sort_by_key(|(fields, _)| fields.current_index);

    let hash = decoded
        .first()
        .map(|(fields, _)| fields.bundle_hash.clone())
        .ok_or_else(|| ClientError::Protocol("attachToTangle returned no transactions".into()))?;
    if let Some((fields, _)) = decoded.iter().find(|(f, _)| f.bundle_hash != hash) {
        return Err(ClientError::Protocol(format!(
            "attached transactions disagree on bundle hash: {} vs {hash}",
            fields.bundle_hash
        )));
    }

    let (transactions, trytes) = decoded.into_iter().unzip();
    Ok(AttachedBundle {
        hash,
        trytes,
        transactions,
    })
}
