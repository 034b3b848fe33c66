// Operation names and their node commands
// This file defines the closed set of operations the routing client can
// dispatch, and how each maps onto a node command
//
// Numan Thabit 2025 Nov

use crate::errors::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A remote operation that can be routed to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operation {
    /// Proof-of-work on a node (`attachToTangle`)
    AttachForPow,
    /// Abort an in-flight proof-of-work (`interruptAttachingToTangle`)
    InterruptPow,
    /// Transaction hashes by bundle hash (`findTransactions`)
    FindByBundle,
    /// Raw transaction trytes by hash (`getTrytes`)
    FetchRawRecords,
    /// Tip selection for attachment (`getTransactionsToApprove`)
    SelectTips,
    Broadcast,
    Store,
    /// Composite: fetch a bundle by tail and resubmit it
    Replay,
    /// Composite: sign, attach, broadcast and store a proposed bundle
    SendTransfer,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::AttachForPow,
        Operation::InterruptPow,
        Operation::FindByBundle,
        Operation::FetchRawRecords,
        Operation::SelectTips,
        Operation::Broadcast,
        Operation::Store,
        Operation::Replay,
        Operation::SendTransfer,
    ];

    /// Kebab-case name used in logs and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AttachForPow => "attach-for-pow",
            Operation::InterruptPow => "interrupt-pow",
            Operation::FindByBundle => "find-by-bundle",
            Operation::FetchRawRecords => "fetch-raw-records",
            Operation::SelectTips => "select-tips",
            Operation::Broadcast => "broadcast",
            Operation::Store => "store",
            Operation::Replay => "replay",
            Operation::SendTransfer => "send-transfer",
        }
    }

    /// Command name as the node API spells it.
    pub fn command(&self) -> &'static str {
        match self {
            Operation::AttachForPow => "attachToTangle",
            Operation::InterruptPow => "interruptAttachingToTangle",
            Operation::FindByBundle => "findTransactions",
            Operation::FetchRawRecords => "getTrytes",
            Operation::SelectTips => "getTransactionsToApprove",
            Operation::Broadcast => "broadcastTransactions",
            Operation::Store => "storeTransactions",
            Operation::Replay => "replayBundle",
            Operation::SendTransfer => "sendTransfer",
        }
    }

    /// Composite operations never reach an endpoint themselves; their
    /// sub-calls are routed one by one.
    pub fn is_composite(&self) -> bool {
        matches!(self, Operation::Replay | Operation::SendTransfer)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Operation {
    type Err = ClientError;

    /// Accepts either spelling, case-insensitively, ignoring `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Operation::ALL
            .into_iter()
            .find(|op| normalize(op.name()) == wanted || normalize(op.command()) == wanted)
            .ok_or_else(|| ClientError::Validation(format!("unknown operation: {s}")))
    }
}

impl TryFrom<String> for Operation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|e: ClientError| e.to_string())
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.name().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
