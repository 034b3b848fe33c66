// In-memory endpoint
// Node stand-in that answers lookups from an in-memory ledger or canned
// responses and records every call; used for dry runs and tests
//
// Numan Thabit 2025 Nov

use crate::errors::{ClientError, ClientResult};
use crate::router::routes::Operation;
use crate::transaction::{decode_fields, TRANSACTION_LEN};
use crate::transport::Endpoint;
use crate::trytes::{Hash, TryteString};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A recorded command.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub params: Value,
}

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Transport(String),
    Protocol(String),
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<Operation, Reply>,
    ledger: Vec<(Hash, TryteString)>,
    calls: Vec<Call>,
}

impl Script {
    fn find_by_bundle(&self, params: &Value) -> ClientResult<Value> {
        let bundles: Vec<Hash> = serde_json::from_value(params["bundles"].clone())
            .map_err(|e| ClientError::Protocol(format!("findTransactions params: {e}")))?;
        let hashes: Vec<&Hash> = self
            .ledger
            .iter()
            .filter(|(_, trytes)| {
                decode_fields(trytes)
                    .map(|f| bundles.contains(&f.bundle_hash))
                    .unwrap_or(false)
            })
            .map(|(hash, _)| hash)
            .collect();
        Ok(json!({ "hashes": hashes }))
    }

    fn fetch_raw_records(&self, params: &Value) -> ClientResult<Value> {
        let hashes: Vec<Hash> = serde_json::from_value(params["hashes"].clone())
            .map_err(|e| ClientError::Protocol(format!("getTrytes params: {e}")))?;
        let trytes: Vec<TryteString> = hashes
            .iter()
            .map(|wanted| {
                self.ledger
                    .iter()
                    .find(|(hash, _)| hash == wanted)
                    .map(|(_, trytes)| trytes.clone())
                    .unwrap_or_else(|| TryteString::null(TRANSACTION_LEN))
            })
            .collect();
        Ok(json!({ "trytes": trytes }))
    }
}

#[derive(Debug)]
pub struct MemoryEndpoint {
    address: String,
    script: Mutex<Script>,
}

impl MemoryEndpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            script: Mutex::new(Script::default()),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a transaction to the ledger served by `findTransactions` and
    /// `getTrytes`.
    pub fn insert_transaction(&self, hash: Hash, trytes: TryteString) -> &Self {
        self.script().ledger.push((hash, trytes));
        self
    }

    /// Answers every later `operation` call with `response`.
    pub fn respond(&self, operation: Operation, response: Value) -> &Self {
        self.script().replies.insert(operation, Reply::Ok(response));
        self
    }

    /// Fails every later `operation` call with a transport error.
    pub fn fail_transport(&self, operation: Operation, message: &str) -> &Self {
        self.script()
            .replies
            .insert(operation, Reply::Transport(message.to_string()));
        self
    }

    /// Fails every later `operation` call with a protocol error.
    pub fn fail_protocol(&self, operation: Operation, message: &str) -> &Self {
        self.script()
            .replies
            .insert(operation, Reply::Protocol(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.script().calls.iter().map(|c| c.operation).collect()
    }
}

impl Endpoint for MemoryEndpoint {
    fn address(&self) -> &str {
        &self.address
    }

    fn execute(&self, operation: Operation, params: Value) -> BoxFuture<'_, ClientResult<Value>> {
        let mut script = self.script();
        script.calls.push(Call {
            operation,
            params: params.clone(),
        });
        // lookups without a scripted reply read the ledger, anything else
        // succeeds with an empty object
        let result = match script.replies.get(&operation).cloned() {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Transport(msg)) => Err(ClientError::Transport(format!(
                "{}: {msg}",
                self.address
            ))),
            Some(Reply::Protocol(msg)) => Err(ClientError::Protocol(format!(
                "{}: {msg}",
                self.address
            ))),
            None => match operation {
                Operation::FindByBundle => script.find_by_bundle(&params),
                Operation::FetchRawRecords => script.fetch_raw_records(&params),
                _ => Ok(json!({})),
            },
        };
        future::ready(result).boxed()
    }
}
