//! # Account Addresses
//!
//! An [`Address`] identifies a party the engine can pay or be governed by:
//! an owner, a transfer destination, or an arbitrary external account.
//! Addresses are opaque 32-byte identifiers — the engine never interprets
//! them beyond equality and the zero check.
//!
//! The all-zeroes address is reserved as the null identity. It is rejected
//! as a transfer destination and as an owner, because in practice a zero
//! destination means "someone forgot to fill in the field" and the funds
//! would be unrecoverable.
//!
//! Serde representation is a lowercase hex string (no prefix), which keeps
//! snapshots human-readable and diffs reviewable.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 32;

/// Errors from parsing an address out of its hex representation.
#[derive(Debug, Error)]
pub enum AddressParseError {
    /// The string was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded byte string had the wrong length.
    #[error("invalid address length: expected {ADDRESS_LEN} bytes, got {got}")]
    InvalidLength {
        /// Number of bytes actually decoded.
        got: usize,
    },
}

/// An opaque 32-byte account identifier.
///
/// `Copy` on purpose: addresses flow through every operation signature and
/// making callers clone them would be pure noise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null identity. Never a valid owner or destination.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Returns `true` if this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Parses an address from a lowercase or uppercase hex string.
    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength { got: bytes.len() })?;
        Ok(Address(arr))
    }

    /// Full lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes, for hashing and canonical encodings.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    /// Truncated hex (`8 leading chars…4 trailing`) for logs. Use
    /// [`Address::to_hex`] when the full value matters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.to_hex();
        write!(f, "{}…{}", &full[..8], &full[full.len() - 4..])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}
