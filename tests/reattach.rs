mod common;

use common::*;
use serde_json::json;
use tangle_router::errors::{ClientError, ErrorKind, SendStage};
use tangle_router::transport::MemoryEndpoint;
use tangle_router::trytes::TryteString;
use tangle_router::Operation;

/// Three-transaction bundle `X` stored as A (index 1), B (tail), C (head).
fn seed_bundle(node: &MemoryEndpoint) -> Vec<TryteString> {
    let x = hash('X');
    let b = raw_tx(&x, &hash('A'), 0, 2, 1_000);
    let a = raw_tx(&x, &hash('C'), 1, 2, 1_000);
    let c = raw_tx(&x, &hash('T'), 2, 2, 1_000);
    node.insert_transaction(hash('A'), a.clone())
        .insert_transaction(hash('B'), b.clone())
        .insert_transaction(hash('C'), c.clone());
    vec![b, a, c]
}

#[tokio::test]
async fn find_tail_picks_index_zero() {
    let (client, public, _local) = routed_client();
    seed_bundle(&public);

    let tail = client.find_tail(&hash('X')).await.unwrap();
    assert_eq!(tail, hash('B'));
    assert_eq!(
        public.operations(),
        vec![Operation::FindByBundle, Operation::FetchRawRecords]
    );
    assert_eq!(public.calls()[0].params, json!({ "bundles": [hash('X')] }));
}

#[tokio::test]
async fn find_tail_ignores_tails_of_other_bundles() {
    let (client, public, _local) = routed_client();
    seed_bundle(&public);
    public.insert_transaction(hash('D'), raw_tx(&hash('Y'), &hash('T'), 0, 0, 9_000));
    // node reports a colliding bundle's transaction first
    public.respond(
        Operation::FindByBundle,
        json!({ "hashes": [hash('D'), hash('A'), hash('B'), hash('C')] }),
    );

    assert_eq!(client.find_tail(&hash('X')).await.unwrap(), hash('B'));
}

#[tokio::test]
async fn latest_attachment_wins_between_reattached_tails() {
    let (client, public, _local) = routed_client();
    let x = hash('X');
    public
        .insert_transaction(hash('E'), raw_tx(&x, &hash('T'), 0, 0, 1_000))
        .insert_transaction(hash('F'), raw_tx(&x, &hash('T'), 0, 0, 5_000));

    assert_eq!(client.find_tail(&x).await.unwrap(), hash('F'));
}

#[tokio::test]
async fn bundle_without_tail_cannot_be_reattached() {
    let (client, public, local) = routed_client();
    let x = hash('X');
    public
        .insert_transaction(hash('A'), raw_tx(&x, &hash('C'), 1, 2, 1_000))
        .insert_transaction(hash('C'), raw_tx(&x, &hash('T'), 2, 2, 1_000));

    let err = client.reattach(&x, 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reconstruction);
    assert!(err.to_string().contains("no tail transaction"));
    assert!(!public.operations().contains(&Operation::SelectTips));
    assert!(local.calls().is_empty());
}

#[tokio::test]
async fn unknown_bundle_is_a_reconstruction_error() {
    let (client, _public, _local) = routed_client();
    let err = client.find_tail(&hash('X')).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reconstruction);
}

#[tokio::test]
async fn reconstruct_orders_by_trunk_chain() {
    let (client, public, _local) = routed_client();
    seed_bundle(&public);

    let records = client.reconstruct_bundle(&hash('X')).await.unwrap();
    let hashes: Vec<_> = records.iter().map(|r| r.hash.clone()).collect();
    assert_eq!(hashes, vec![hash('B'), hash('A'), hash('C')]);
    assert!(records[2].is_head());
}

#[tokio::test]
async fn get_bundle_walks_trunk_one_fetch_per_transaction() {
    let (client, public, _local) = routed_client();
    let expected = seed_bundle(&public);

    let records = client.get_bundle(&hash('B')).await.unwrap();
    let trytes: Vec<_> = records.into_iter().map(|r| r.trytes).collect();
    assert_eq!(trytes, expected);
    assert_eq!(public.operations(), vec![Operation::FetchRawRecords; 3]);
}

#[tokio::test]
async fn get_bundle_rejects_non_tail_start() {
    let (client, public, _local) = routed_client();
    seed_bundle(&public);

    let err = client.get_bundle(&hash('A')).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reconstruction);
    assert!(err.to_string().contains("not a tail"));
}

#[tokio::test]
async fn get_bundle_rejects_unknown_transaction() {
    let (client, _public, _local) = routed_client();
    let err = client.get_bundle(&hash('Q')).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reconstruction);
}

#[tokio::test]
async fn get_bundle_rejects_broken_chain() {
    let (client, public, _local) = routed_client();
    let x = hash('X');
    // tail's trunk points at a transaction of another bundle
    public
        .insert_transaction(hash('B'), raw_tx(&x, &hash('D'), 0, 1, 1_000))
        .insert_transaction(hash('D'), raw_tx(&hash('Y'), &hash('T'), 1, 1, 1_000));

    let err = client.get_bundle(&hash('B')).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reconstruction);
}

#[tokio::test]
async fn reattach_fetches_publicly_and_attaches_locally() {
    let (client, public, local) = routed_client();
    let tail_first = seed_bundle(&public);
    let head_first: Vec<_> = tail_first.iter().rev().cloned().collect();
    public.respond(Operation::SelectTips, tips_response());
    local.respond(Operation::AttachForPow, json!({ "trytes": head_first }));

    let attached = client.reattach(&hash('X'), 3).await.unwrap();
    assert_eq!(attached.hash, hash('X'));
    assert_eq!(attached.trytes, tail_first);

    assert_eq!(local.operations(), vec![Operation::AttachForPow]);
    assert_eq!(local.calls()[0].params["trytes"], json!(head_first));
    assert_eq!(
        public.operations(),
        vec![
            Operation::FindByBundle,
            Operation::FetchRawRecords,
            Operation::FetchRawRecords,
            Operation::FetchRawRecords,
            Operation::FetchRawRecords,
            Operation::SelectTips,
            Operation::Broadcast,
            Operation::Store,
        ]
    );
    assert_eq!(public.calls()[6].params["trytes"], json!(tail_first));
}

#[tokio::test]
async fn replay_reports_attach_stage_failures() {
    let (client, public, local) = routed_client();
    seed_bundle(&public);
    public.respond(Operation::SelectTips, tips_response());
    local.fail_protocol(Operation::AttachForPow, "Invalid parameters");

    let err = client.replay_bundle(&hash('B'), 3).await.unwrap_err();
    match &err {
        ClientError::Send { stage, source } => {
            assert_eq!(*stage, SendStage::Attach);
            assert!(source.to_string().contains("Invalid parameters"));
        }
        other => panic!("expected a send error, got {other}"),
    }
    assert_eq!(
        local.operations(),
        vec![Operation::AttachForPow, Operation::InterruptPow]
    );
}

#[tokio::test]
async fn short_get_trytes_answer_is_a_protocol_error() {
    let (client, public, _local) = routed_client();
    seed_bundle(&public);
    public.respond(Operation::FetchRawRecords, json!({ "trytes": [] }));

    let err = client.get_trytes(&[hash('A'), hash('B')]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("0 entries for 2 hashes"));

    let err = client.find_tail(&hash('X')).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}
