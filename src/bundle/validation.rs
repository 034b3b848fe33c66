// Proposed-transaction validation module
// Checks value range, tag length and timestamp range before a transaction is accepted
// into a proposed bundle; address shape is enforced by the Address type
//
// Numan Thabit 2025 Nov

use crate::bundle::proposed::ProposedTransaction;
use crate::errors::{ClientError, ClientResult};
use crate::transaction::TAG_LEN;

/// Total token supply; no single output may exceed it.
pub const MAX_SUPPLY: i64 = 2_779_530_283_277_761;
/// Largest value a 9-tryte timestamp field holds, (27^9 - 1) / 2.
pub const MAX_TIMESTAMP: u64 = 3_812_798_742_493;

/// Validation result collecting every failed check
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn into_result(self) -> ClientResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ClientError::Validation(self.errors.join("; ")))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a proposed transaction before it joins a bundle
pub fn validate_transaction(tx: &ProposedTransaction) -> ValidationResult {
    let mut result = ValidationResult::new();

    // 1. Outputs carry non-negative value; inputs are added by the signer
    if tx.value < 0 {
        result.add_error(format!(
            "value {} is negative; inputs are balanced by the signer",
            tx.value
        ));
    } else if tx.value > MAX_SUPPLY {
        result.add_error(format!("value {} exceeds total supply {MAX_SUPPLY}", tx.value));
    }

    // 2. Tag fits its field (27 trytes = 81 trits)
    if let Some(tag) = &tx.tag {
        if tag.len() > TAG_LEN {
            result.add_error(format!(
                "tag is {} trytes, limit is {TAG_LEN}",
                tag.len()
            ));
        }
    }

    // 3. Timestamp fits its field
    if tx.timestamp > MAX_TIMESTAMP {
        result.add_error(format!(
            "timestamp {} exceeds field limit {MAX_TIMESTAMP}",
            tx.timestamp
        ));
    }

    result
}
