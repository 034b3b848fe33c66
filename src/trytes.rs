// Tryte string types and base-27 codecs
// This file implements the ledger's tryte alphabet, validated tryte strings,
// fixed-width hashes and addresses, and the integer/text encodings used in
// transaction fields
//
// Numan Thabit 2025 Nov

use crate::errors::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length in trytes of transaction, bundle and address hashes.
pub const HASH_LEN: usize = 81;
/// Address length including the 9-tryte checksum.
pub const ADDRESS_WITH_CHECKSUM_LEN: usize = 90;

fn tryte_index(c: u8) -> Option<u8> {
    match c {
        b'9' => Some(0),
        b'A'..=b'Z' => Some(c - b'A' + 1),
        _ => None,
    }
}

/// Balanced value of a tryte: `9`=0, `A..M`=1..13, `N..Z`=-13..-1.
fn tryte_value(c: u8) -> Option<i8> {
    tryte_index(c).map(|i| if i > 13 { i as i8 - 27 } else { i as i8 })
}

fn check_alphabet(s: &str) -> Result<(), String> {
    match s
        .char_indices()
        .find(|(_, c)| !c.is_ascii() || tryte_index(*c as u8).is_none())
    {
        Some((pos, c)) => Err(format!("invalid tryte {c:?} at position {pos}")),
        None => Ok(()),
    }
}

/// A string over the tryte alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TryteString(String);

impl TryteString {
    pub fn new(s: impl Into<String>) -> ClientResult<Self> {
        let s = s.into();
        check_alphabet(&s).map_err(ClientError::Validation)?;
        Ok(Self(s))
    }

    /// Wraps a string assembled from already-valid trytes.
    pub(crate) fn from_trusted(s: String) -> Self {
        debug_assert!(check_alphabet(&s).is_ok());
        Self(s)
    }

    /// Encodes text two trytes per byte (low digit first).
    pub fn from_text(text: &str) -> Self {
        let mut out = String::with_capacity(text.len() * 2);
        for byte in text.bytes() {
            out.push(TRYTE_ALPHABET[(byte % 27) as usize] as char);
            out.push(TRYTE_ALPHABET[(byte / 27) as usize] as char);
        }
        Self(out)
    }

    /// Decodes a text message, ignoring trailing `9` padding. Returns `None`
    /// when the trytes do not encode valid UTF-8.
    pub fn to_text(&self) -> Option<String> {
        let trimmed = self.0.trim_end_matches('9');
        let mut bytes = Vec::with_capacity(trimmed.len() / 2 + 1);
        let raw = trimmed.as_bytes();
        for pair in raw.chunks(2) {
            let low = tryte_index(pair[0])? as u16;
            let high = pair.get(1).map_or(Some(0), |c| tryte_index(*c))? as u16;
            let value = low + high * 27;
            bytes.push(u8::try_from(value).ok()?);
        }
        String::from_utf8(bytes).ok()
    }

    /// All-`9` string of the given length.
    pub fn null(len: usize) -> Self {
        Self("9".repeat(len))
    }

    /// Right-pads with `9` up to `len`; longer strings are returned unchanged.
    pub fn padded(&self, len: usize) -> Self {
        let mut s = self.0.clone();
        while s.len() < len {
            s.push('9');
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits into consecutive chunks of at most `size` trytes.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = TryteString> + '_ {
        self.0
            .as_bytes()
            .chunks(size)
            .map(|c| TryteString(c.iter().map(|b| *b as char).collect()))
    }
}

impl TryFrom<String> for TryteString {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        check_alphabet(&s)?;
        Ok(Self(s))
    }
}

impl From<TryteString> for String {
    fn from(t: TryteString) -> Self {
        t.0
    }
}

impl FromStr for TryteString {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TryteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An 81-tryte transaction or bundle hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash(String);

impl Hash {
    pub fn new(s: impl Into<String>) -> ClientResult<Self> {
        Self::try_from(s.into()).map_err(ClientError::Validation)
    }

    pub fn null() -> Self {
        Self("9".repeat(HASH_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Hash {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.len() != HASH_LEN {
            return Err(format!("hash must be {HASH_LEN} trytes, got {}", s.len()));
        }
        check_alphabet(&s)?;
        Ok(Self(s))
    }
}

impl From<Hash> for String {
    fn from(h: Hash) -> Self {
        h.0
    }
}

impl FromStr for Hash {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recipient address. Accepts the bare 81-tryte form or the 90-tryte form
/// with checksum; the checksum is kept for display but not verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    hash: Hash,
    checksum: Option<String>,
}

impl Address {
    pub fn new(s: &str) -> ClientResult<Self> {
        match s.len() {
            HASH_LEN => Ok(Self {
                hash: Hash::new(s)?,
                checksum: None,
            }),
            ADDRESS_WITH_CHECKSUM_LEN => {
                check_alphabet(s).map_err(ClientError::Validation)?;
                Ok(Self {
                    hash: Hash::new(&s[..HASH_LEN])?,
                    checksum: Some(s[HASH_LEN..].to_string()),
                })
            }
            other => Err(ClientError::Validation(format!(
                "address must be {HASH_LEN} or {ADDRESS_WITH_CHECKSUM_LEN} trytes, got {other}"
            ))),
        }
    }

    /// The 81-tryte address without checksum.
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hash.as_str())?;
        if let Some(checksum) = &self.checksum {
            f.write_str(checksum)?;
        }
        Ok(())
    }
}

/// Encodes `value` in balanced base 27, least significant tryte first,
/// padded with `9` to `width`.
pub fn encode_int(value: i64, width: usize) -> TryteString {
    let mut n = value as i128;
    let mut out = String::with_capacity(width);
    while n != 0 {
        let mut digit = n.rem_euclid(27);
        if digit > 13 {
            digit -= 27;
        }
        n = (n - digit) / 27;
        let index = if digit < 0 { digit + 27 } else { digit };
        out.push(TRYTE_ALPHABET[index as usize] as char);
    }
    TryteString(out).padded(width)
}

/// Decodes a balanced base-27 integer, least significant tryte first.
pub fn decode_int(trytes: &str) -> ClientResult<i64> {
    let mut acc: i128 = 0;
    for c in trytes.bytes().rev() {
        let digit = tryte_value(c)
            .ok_or_else(|| ClientError::Protocol(format!("invalid tryte {:?} in integer", c as char)))?;
        acc = acc
            .checked_mul(27)
            .and_then(|v| v.checked_add(digit as i128))
            .ok_or_else(|| ClientError::Protocol(format!("integer field {trytes} overflows")))?;
    }
    i64::try_from(acc).map_err(|_| ClientError::Protocol(format!("integer field {trytes} overflows")))
}
