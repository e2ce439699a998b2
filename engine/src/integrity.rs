//! # Integrity Guard — Content-Hash Tamper Detection
//!
//! Every stored transaction carries a BLAKE3 digest of its immutable
//! fields (`destination`, `value`, `payload`), computed once at submission.
//! Before the engine acts on a record — confirm or execute — it recomputes
//! the digest and compares. A mismatch means something wrote to the store
//! outside the engine's API: a corrupted disk, a buggy migration, a
//! compromised administrative path. The record is then frozen; no further
//! state transition is allowed on it.
//!
//! This is defense in depth against the storage layer, not a performance
//! optimization, and not a substitute for access control on the store
//! itself.
//!
//! ## Canonical encoding
//!
//! The digest is taken over a length-prefixed encoding so that no two
//! distinct `(destination, value, payload)` triples can collide by
//! boundary-shifting:
//!
//! ```text
//! BLAKE3( "custodian.tx.v1" || destination (32 bytes)
//!         || value (u64 LE) || payload_len (u64 LE) || payload )
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::address::Address;
use crate::error::EngineError;
use crate::store::Transaction;

/// Domain separation tag. Bump the version suffix if the encoding ever
/// changes, so old digests can never validate against new encodings.
const DOMAIN_TAG: &[u8] = b"custodian.tx.v1";

/// A 32-byte BLAKE3 digest over a transaction's immutable fields.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IntegrityHash(pub [u8; 32]);

impl IntegrityHash {
    /// Full lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityHash({})", self.to_hex())
    }
}

impl fmt::Display for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl Serialize for IntegrityHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IntegrityHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| de::Error::custom("integrity hash must be 32 bytes"))?;
        Ok(IntegrityHash(arr))
    }
}

/// Computes the content hash over a transaction's immutable fields.
///
/// Pure and deterministic: the same triple always yields the same digest,
/// on every platform.
pub fn hash_of(destination: &Address, value: u64, payload: &[u8]) -> IntegrityHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(destination.as_bytes());
    hasher.update(&value.to_le_bytes());
    hasher.update(&(payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    IntegrityHash(*hasher.finalize().as_bytes())
}

/// Verifies a stored record against a freshly recomputed digest.
///
/// # Errors
///
/// [`EngineError::IntegrityViolation`] if the stored hash does not match.
/// Callers must propagate this before any state mutation or external call.
pub fn verify(tx: &Transaction) -> Result<(), EngineError> {
    let fresh = hash_of(&tx.destination, tx.value, &tx.payload);
    // Not constant-time, and doesn't need to be: the digest detects
    // corruption, it is not a secret.
    if fresh != tx.integrity_hash {
        return Err(EngineError::IntegrityViolation { id: tx.id });
    }
    Ok(())
}
