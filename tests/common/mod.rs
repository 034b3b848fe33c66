//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;
use tangle_router::bundle::{ProposedBundle, ProposedTransaction};
use tangle_router::errors::{ClientError, ClientResult};
use tangle_router::signing::BundleSigner;
use tangle_router::transport::MemoryEndpoint;
use tangle_router::trytes::{encode_int, Address, Hash, TryteString};
use tangle_router::{Operation, OperationRouter, RoutingClient};

pub const PUBLIC_NODE: &str = "http://176.9.3.149:14265";
pub const LOCAL_NODE: &str = "http://localhost:14265";

pub fn hash(c: char) -> Hash {
    Hash::new(c.to_string().repeat(81)).unwrap()
}

/// Raw trytes of an attached transaction with the given chain position.
pub fn raw_tx(bundle: &Hash, trunk: &Hash, index: u64, last: u64, attached_at: i64) -> TryteString {
    let mut raw = String::with_capacity(2673);
    raw.push_str(&"9".repeat(2187)); // fragment
    raw.push_str(&"A".repeat(81)); // address
    raw.push_str(&"9".repeat(27 + 27 + 9)); // value, legacy tag, timestamp
    raw.push_str(encode_int(index as i64, 9).as_str());
    raw.push_str(encode_int(last as i64, 9).as_str());
    raw.push_str(bundle.as_str());
    raw.push_str(trunk.as_str());
    raw.push_str(&"9".repeat(81 + 27)); // branch, tag
    raw.push_str(encode_int(attached_at, 9).as_str());
    raw.push_str(&"9".repeat(9 + 9 + 27)); // bounds, nonce
    assert_eq!(raw.len(), 2673);
    TryteString::new(raw).unwrap()
}

/// Default endpoint for everything, local endpoint for PoW.
pub fn routed_client() -> (RoutingClient, Arc<MemoryEndpoint>, Arc<MemoryEndpoint>) {
    let public = Arc::new(MemoryEndpoint::new(PUBLIC_NODE));
    let local = Arc::new(MemoryEndpoint::new(LOCAL_NODE));
    let router = OperationRouter::new(public.clone())
        .with_route(Operation::AttachForPow, local.clone())
        .with_route(Operation::InterruptPow, local.clone());
    (RoutingClient::new(router), public, local)
}

pub fn tips_response() -> serde_json::Value {
    serde_json::json!({
        "trunkTransaction": hash('T'),
        "branchTransaction": hash('U'),
    })
}

pub fn sample_bundle() -> ProposedBundle {
    let address = Address::new(
        "ADDRESS9GOES9HERE99999999999999999999999999999999999TESTVALUE9DONTUSEINPRODUCTION",
    )
    .unwrap();
    let mut bundle = ProposedBundle::new();
    bundle
        .add_transaction(
            ProposedTransaction::new(address, 1)
                .with_tag(TryteString::new("ROUTING9WRAPPER9WORKS").unwrap())
                .with_message(TryteString::from_text(
                    "I used iota.adapter.wrappers.RoutingWrapper.",
                ))
                .with_timestamp(1_520_000_000),
        )
        .unwrap();
    bundle
}

/// Lays out the bundle under a fixed bundle hash; no real signatures.
pub struct FixedHashSigner {
    pub bundle_hash: Hash,
}

impl FixedHashSigner {
    pub fn signed(&self, bundle: &ProposedBundle) -> Vec<TryteString> {
        bundle.unsigned_trytes(&self.bundle_hash)
    }
}

impl BundleSigner for FixedHashSigner {
    fn sign<'a>(
        &'a self,
        _client: &'a RoutingClient,
        bundle: &'a ProposedBundle,
    ) -> BoxFuture<'a, ClientResult<Vec<TryteString>>> {
        future::ready(Ok(self.signed(bundle))).boxed()
    }
}

/// Refuses to reuse a bundle hash the node already knows, looking it up
/// through the client before signing.
pub struct FreshHashSigner {
    pub bundle_hash: Hash,
}

impl BundleSigner for FreshHashSigner {
    fn sign<'a>(
        &'a self,
        client: &'a RoutingClient,
        bundle: &'a ProposedBundle,
    ) -> BoxFuture<'a, ClientResult<Vec<TryteString>>> {
        async move {
            let known = client
                .find_transactions(std::slice::from_ref(&self.bundle_hash))
                .await?;
            if !known.is_empty() {
                return Err(ClientError::Validation(format!(
                    "bundle {} already on the ledger",
                    self.bundle_hash
                )));
            }
            Ok(bundle.unsigned_trytes(&self.bundle_hash))
        }
        .boxed()
    }
}

pub struct FailingSigner;

impl BundleSigner for FailingSigner {
    fn sign<'a>(
        &'a self,
        _client: &'a RoutingClient,
        _bundle: &'a ProposedBundle,
    ) -> BoxFuture<'a, ClientResult<Vec<TryteString>>> {
        future::ready(Err(ClientError::Validation(
            "insufficient balance for inputs".into(),
        )))
        .boxed()
    }
}
