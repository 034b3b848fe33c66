// Routing client facade
// This file exposes one method per node command, each resolved through the
// operation router, plus the record-level composites built on them
//
// Numan Thabit 2025 Nov

use crate::bundle::reconstruct::{assemble, check_link, select_tail};
use crate::errors::{ClientError, ClientResult};
use crate::router::execution::PipelineCounters;
use crate::router::routes::Operation;
use crate::router::selector::OperationRouter;
use crate::transaction::{TransactionRecord, TRANSACTION_LEN};
use crate::trytes::{Hash, TryteString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Default minimum weight magnitude for mainnet PoW.
pub const DEFAULT_MIN_WEIGHT_MAGNITUDE: u8 = 14;
/// Highest weight magnitude a transaction hash can satisfy (243 trits).
pub const MAX_MIN_WEIGHT_MAGNITUDE: u8 = 243;

/// Trunk and branch transactions returned by tip selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tips {
    pub trunk_transaction: Hash,
    pub branch_transaction: Hash,
}

#[derive(Debug, Deserialize)]
struct HashesResponse {
    hashes: Vec<Hash>,
}

#[derive(Debug, Deserialize)]
struct TrytesResponse {
    trytes: Vec<TryteString>,
}

/// Uniform client over any number of nodes. Each call resolves its operation
/// through the router and forwards it; failures propagate unchanged.
pub struct RoutingClient {
    router: Arc<OperationRouter>,
    min_weight_magnitude: u8,
    pub(crate) counters: PipelineCounters,
}

impl RoutingClient {
    pub fn new(router: OperationRouter) -> Self {
        Self {
            router: Arc::new(router),
            min_weight_magnitude: DEFAULT_MIN_WEIGHT_MAGNITUDE,
            counters: PipelineCounters::default(),
        }
    }

    pub fn with_min_weight_magnitude(mut self, mwm: u8) -> Self {
        self.min_weight_magnitude = mwm;
        self
    }

    pub fn router(&self) -> &OperationRouter {
        &self.router
    }

    pub fn min_weight_magnitude(&self) -> u8 {
        self.min_weight_magnitude
    }

    async fn call<T: DeserializeOwned>(&self, operation: Operation, params: Value) -> ClientResult<T> {
        let endpoint = self.router.resolve(operation);
        debug!(
            operation = %operation,
            endpoint = %endpoint.address(),
            "dispatching node command"
        );
        let body = endpoint.execute(operation, params).await?;
        serde_json::from_value(body).map_err(|e| {
            ClientError::Protocol(format!(
                "{} response from {}: {e}",
                operation.command(),
                endpoint.address()
            ))
        })
    }

    /// Hashes of all transactions carrying one of `bundles`.
    pub async fn find_transactions(&self, bundles: &[Hash]) -> ClientResult<Vec<Hash>> {
        if bundles.is_empty() {
            return Err(ClientError::Validation("find-by-bundle needs at least one bundle hash".into()));
        }
        let resp: HashesResponse = self
            .call(Operation::FindByBundle, json!({ "bundles": bundles }))
            .await?;
        Ok(resp.hashes)
    }

    /// Raw trytes for `hashes`, in request order.
    pub async fn get_trytes(&self, hashes: &[Hash]) -> ClientResult<Vec<TryteString>> {
        if hashes.is_empty() {
            return Err(ClientError::Validation("fetch-raw-records needs at least one hash".into()));
        }
        let resp: TrytesResponse = self
            .call(Operation::FetchRawRecords, json!({ "hashes": hashes }))
            .await?;
        if resp.trytes.len() != hashes.len() {
            return Err(ClientError::Protocol(format!(
                "getTrytes returned {} entries for {} hashes",
                resp.trytes.len(),
                hashes.len()
            )));
        }
        Ok(resp.trytes)
    }

    pub async fn get_transactions_to_approve(&self, depth: u32) -> ClientResult<Tips> {
        self.call(Operation::SelectTips, json!({ "depth": depth })).await
    }

    /// Runs PoW on `trytes` (head first) and returns the attached trytes.
    pub async fn attach_to_tangle(
        &self,
        tips: &Tips,
        min_weight_magnitude: u8,
        trytes: &[TryteString],
    ) -> ClientResult<Vec<TryteString>> {
        if min_weight_magnitude == 0 || min_weight_magnitude > MAX_MIN_WEIGHT_MAGNITUDE {
            return Err(ClientError::Validation(format!(
                "min weight magnitude must be 1..={MAX_MIN_WEIGHT_MAGNITUDE}, got {min_weight_magnitude}"
            )));
        }
        check_transaction_trytes(trytes)?;
        let resp: TrytesResponse = self
            .call(
                Operation::AttachForPow,
                json!({
                    "trunkTransaction": tips.trunk_transaction,
                    "branchTransaction": tips.branch_transaction,
                    "minWeightMagnitude": min_weight_magnitude,
                    "trytes": trytes,
                }),
            )
            .await?;
        Ok(resp.trytes)
    }

    pub async fn interrupt_attaching_to_tangle(&self) -> ClientResult<()> {
        let _: Value = self.call(Operation::InterruptPow, json!({})).await?;
        Ok(())
    }

    pub async fn broadcast_transactions(&self, trytes: &[TryteString]) -> ClientResult<()> {
        check_transaction_trytes(trytes)?;
        let _: Value = self
            .call(Operation::Broadcast, json!({ "trytes": trytes }))
            .await?;
        Ok(())
    }

    pub async fn store_transactions(&self, trytes: &[TryteString]) -> ClientResult<()> {
        check_transaction_trytes(trytes)?;
        let _: Value = self
            .call(Operation::Store, json!({ "trytes": trytes }))
            .await?;
        Ok(())
    }

    /// Fetches and decodes `hashes`. Each record takes its hash from the
    /// request, position for position.
    pub async fn fetch_records(&self, hashes: &[Hash]) -> ClientResult<Vec<TransactionRecord>> {
        let trytes = self.get_trytes(hashes).await?;
        hashes
            .iter()
            .cloned()
            .zip(trytes)
            .map(|(hash, raw)| TransactionRecord::from_trytes(hash, raw))
            .collect()
    }

    /// Every record the node reports under `bundle_hash`. The lookup result is
    /// not filtered; records of colliding bundles may be included.
    pub async fn find_bundle_records(&self, bundle_hash: &Hash) -> ClientResult<Vec<TransactionRecord>> {
        let hashes = self.find_transactions(std::slice::from_ref(bundle_hash)).await?;
        if hashes.is_empty() {
            return Err(ClientError::Reconstruction(format!(
                "no transactions found for bundle {bundle_hash}"
            )));
        }
        debug!(bundle = %bundle_hash, transactions = hashes.len(), "fetched bundle transaction hashes");
        self.fetch_records(&hashes).await
    }

    /// Hash of the tail transaction of `bundle_hash`.
    pub async fn find_tail(&self, bundle_hash: &Hash) -> ClientResult<Hash> {
        let records = self.find_bundle_records(bundle_hash).await?;
        let tail = select_tail(&records, bundle_hash)?;
        info!(bundle = %bundle_hash, tail = %tail.hash, "tail transaction located");
        Ok(tail.hash.clone())
    }

    /// The ordered transactions of `bundle_hash`, reconstructed from the
    /// node's lookup results.
    pub async fn reconstruct_bundle(&self, bundle_hash: &Hash) -> ClientResult<Vec<TransactionRecord>> {
        let records = self.find_bundle_records(bundle_hash).await?;
        assemble(&records, bundle_hash)
    }

    /// Walks the trunk chain from `tail` to the bundle head, one fetch per
    /// transaction.
    pub async fn get_bundle(&self, tail: &Hash) -> ClientResult<Vec<TransactionRecord>> {
        let mut chain: Vec<TransactionRecord> = Vec::new();
        let mut next = tail.clone();
        loop {
            let record = self
                .fetch_records(std::slice::from_ref(&next))
                .await?
                .pop()
                .ok_or_else(|| ClientError::Protocol(format!("no trytes returned for {next}")))?;
            if record.is_null() {
                return Err(ClientError::Reconstruction(format!(
                    "transaction {next} is unknown to the node"
                )));
            }
            match chain.last() {
                None if !record.is_tail() => {
                    return Err(ClientError::Reconstruction(format!(
                        "transaction {next} is not a tail (index {})",
                        record.current_index
                    )))
                }
                None => {}
                Some(prev) => check_link(prev, &record)?,
            }
            let done = record.is_head();
            next = record.trunk.clone();
            chain.push(record);
            if done {
                break;
            }
        }
        Ok(chain)
    }
}

impl std::fmt::Debug for RoutingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingClient")
            .field("router", &self.router)
            .field("min_weight_magnitude", &self.min_weight_magnitude)
            .finish()
    }
}

/// Trytes handed to attach, broadcast or store must be whole transactions.
fn check_transaction_trytes(trytes: &[TryteString]) -> ClientResult<()> {
    if trytes.is_empty() {
        return Err(ClientError::Validation("no transaction trytes given".into()));
    }
    if let Some((i, t)) = trytes.iter().enumerate().find(|(_, t)| t.len() != TRANSACTION_LEN) {
        return Err(ClientError::Validation(format!(
            "transaction {i} is {} trytes, expected {TRANSACTION_LEN}",
            t.len()
        )));
    }
    Ok(())
}
