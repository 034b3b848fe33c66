// Transaction layout codec
// This file decodes raw 2673-tryte transactions into records and lays out
// unsigned transactions for the signing and PoW collaborators
//
// Numan Thabit 2025 Nov

use crate::errors::{ClientError, ClientResult};
use crate::trytes::{decode_int, encode_int, Hash, TryteString, HASH_LEN};
use serde::Serialize;
use std::ops::Range;

pub const TRANSACTION_LEN: usize = 2673;
pub const FRAGMENT_LEN: usize = 2187;
pub const TAG_LEN: usize = 27;

const FRAGMENT: Range<usize> = 0..2187;
const ADDRESS: Range<usize> = 2187..2268;
const VALUE: Range<usize> = 2268..2295;
const TIMESTAMP: Range<usize> = 2322..2331;
const CURRENT_INDEX: Range<usize> = 2331..2340;
const LAST_INDEX: Range<usize> = 2340..2349;
const BUNDLE: Range<usize> = 2349..2430;
const TRUNK: Range<usize> = 2430..2511;
const BRANCH: Range<usize> = 2511..2592;
const TAG: Range<usize> = 2592..2619;
const ATTACHMENT_TIMESTAMP: Range<usize> = 2619..2628;
const ATTACHMENT_LOWER: Range<usize> = 2628..2637;
const ATTACHMENT_UPPER: Range<usize> = 2637..2646;
const NONCE: Range<usize> = 2646..2673;

/// A transaction fetched from a node, decoded from its raw trytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub hash: Hash,
    pub address: Hash,
    pub value: i64,
    pub tag: TryteString,
    pub timestamp: u64,
    pub current_index: u64,
    pub last_index: u64,
    pub bundle_hash: Hash,
    pub trunk: Hash,
    pub branch: Hash,
    pub attachment_timestamp: i64,
    #[serde(skip)]
    pub trytes: TryteString,
}

impl TransactionRecord {
    /// Decodes `trytes`, using `hash` as the record identifier.
    pub fn from_trytes(hash: Hash, trytes: TryteString) -> ClientResult<Self> {
        let header = decode_fields(&trytes)?;
        Ok(Self {
            hash,
            address: header.address,
            value: header.value,
            tag: header.tag,
            timestamp: header.timestamp,
            current_index: header.current_index,
            last_index: header.last_index,
            bundle_hash: header.bundle_hash,
            trunk: header.trunk,
            branch: header.branch,
            attachment_timestamp: header.attachment_timestamp,
            trytes,
        })
    }

    pub fn is_tail(&self) -> bool {
        self.current_index == 0
    }

    /// Nodes answer unknown hashes with all-`9` trytes.
    pub fn is_null(&self) -> bool {
        self.trytes.as_str().bytes().all(|b| b == b'9')
    }

    pub fn is_head(&self) -> bool {
        self.current_index == self.last_index
    }

    /// Message fragment of this transaction decoded as text, if it is text.
    pub fn message(&self) -> Option<String> {
        TryteString::new(&self.trytes.as_str()[FRAGMENT])
            .ok()
            .and_then(|t| t.to_text())
    }
}

/// Fields of a raw transaction that do not depend on its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    pub address: Hash,
    pub value: i64,
    pub tag: TryteString,
    pub timestamp: u64,
    pub current_index: u64,
    pub last_index: u64,
    pub bundle_hash: Hash,
    pub trunk: Hash,
    pub branch: Hash,
    pub attachment_timestamp: i64,
}

fn field(trytes: &str, range: Range<usize>) -> &str {
    &trytes[range]
}

fn hash_field(trytes: &str, range: Range<usize>, name: &str) -> ClientResult<Hash> {
    Hash::new(field(trytes, range))
        .map_err(|e| ClientError::Protocol(format!("transaction {name} field: {e}")))
}

fn unsigned_field(trytes: &str, range: Range<usize>, name: &str) -> ClientResult<u64> {
    let v = decode_int(field(trytes, range))?;
    u64::try_from(v).map_err(|_| ClientError::Protocol(format!("transaction {name} is negative: {v}")))
}

/// Decodes the fixed-offset fields of a raw transaction.
pub fn decode_fields(trytes: &TryteString) -> ClientResult<TransactionFields> {
    if trytes.len() != TRANSACTION_LEN {
        return Err(ClientError::Protocol(format!(
            "transaction must be {TRANSACTION_LEN} trytes, got {}",
            trytes.len()
        )));
    }
    let raw = trytes.as_str();
    let fields = TransactionFields {
        address: hash_field(raw, ADDRESS, "address")?,
        value: decode_int(field(raw, VALUE))?,
        tag: TryteString::new(field(raw, TAG))?,
        timestamp: unsigned_field(raw, TIMESTAMP, "timestamp")?,
        current_index: unsigned_field(raw, CURRENT_INDEX, "current index")?,
        last_index: unsigned_field(raw, LAST_INDEX, "last index")?,
        bundle_hash: hash_field(raw, BUNDLE, "bundle")?,
        trunk: hash_field(raw, TRUNK, "trunk")?,
        branch: hash_field(raw, BRANCH, "branch")?,
        attachment_timestamp: decode_int(field(raw, ATTACHMENT_TIMESTAMP))?,
    };
    if fields.current_index > fields.last_index {
        return Err(ClientError::Protocol(format!(
            "transaction index {} exceeds last index {}",
            fields.current_index, fields.last_index
        )));
    }
    Ok(fields)
}

/// One unsigned transaction slot, before signing and PoW.
#[derive(Debug, Clone)]
pub(crate) struct UnsignedSlot<'a> {
    pub fragment: TryteString,
    pub address: &'a Hash,
    pub value: i64,
    pub tag: &'a TryteString,
    pub timestamp: u64,
    pub current_index: u64,
    pub last_index: u64,
}

impl UnsignedSlot<'_> {
    /// Lays out the slot as raw trytes. Trunk, branch, nonce and attachment
    /// fields are left null for the PoW node to fill.
    pub fn encode(&self, bundle_hash: &Hash) -> TryteString {
        let tag = self.tag.padded(TAG_LEN);
        let mut out = String::with_capacity(TRANSACTION_LEN);
        out.push_str(self.fragment.padded(FRAGMENT_LEN).as_str());
        out.push_str(self.address.as_str());
        out.push_str(encode_int(self.value, VALUE.len()).as_str());
        // legacy tag
        out.push_str(tag.as_str());
        out.push_str(encode_int(self.timestamp as i64, TIMESTAMP.len()).as_str());
        out.push_str(encode_int(self.current_index as i64, CURRENT_INDEX.len()).as_str());
        out.push_str(encode_int(self.last_index as i64, LAST_INDEX.len()).as_str());
        out.push_str(bundle_hash.as_str());
        out.push_str(&"9".repeat(HASH_LEN * 2));
        out.push_str(tag.as_str());
        out.push_str(&"9".repeat(ATTACHMENT_TIMESTAMP.len() + ATTACHMENT_LOWER.len() + ATTACHMENT_UPPER.len()));
        out.push_str(&"9".repeat(NONCE.len()));
        debug_assert_eq!(out.len(), TRANSACTION_LEN);
        TryteString::from_trusted(out)
    }
}
