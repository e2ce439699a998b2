//! # Owner Registry
//!
//! The fixed set of co-owners sharing custody of the pool, plus the
//! confirmation quorum. Both are sealed at construction and never change —
//! membership workflows (adding or removing owners, re-thresholding) are
//! deliberately outside this engine, so the registry has no mutating
//! methods at all. That immutability is what lets every other component
//! treat authorization checks as pure reads.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::address::Address;
use crate::error::ConfigError;

/// Immutable owner set and confirmation quorum.
///
/// Construction is the only fallible moment: the list must be non-empty,
/// duplicate-free, free of the zero address, and the quorum must satisfy
/// `1 <= quorum <= owners.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRegistry {
    /// Owners in the order they were supplied. Order is preserved so that
    /// [`OwnerRegistry::owners`] is deterministic across restarts.
    owners: Vec<Address>,

    /// Distinct confirmations required before execution is permitted.
    quorum: usize,
}

impl OwnerRegistry {
    /// Validates and seals an owner set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoOwners`] for an empty list,
    /// [`ConfigError::ZeroOwner`] if the null identity appears,
    /// [`ConfigError::DuplicateOwner`] for repeated addresses, and
    /// [`ConfigError::BadQuorum`] if `quorum` is outside `[1, len]`.
    pub fn new(owners: Vec<Address>, quorum: usize) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::NoOwners);
        }
        if owners.iter().any(Address::is_zero) {
            return Err(ConfigError::ZeroOwner);
        }
        let distinct: HashSet<&Address> = owners.iter().collect();
        if distinct.len() != owners.len() {
            return Err(ConfigError::DuplicateOwner);
        }
        if quorum == 0 || quorum > owners.len() {
            return Err(ConfigError::BadQuorum {
                quorum,
                owners: owners.len(),
            });
        }
        Ok(Self { owners, quorum })
    }

    /// Membership check. O(n) over a handful of owners beats carrying a
    /// second index structure around.
    pub fn is_owner(&self, who: &Address) -> bool {
        self.owners.contains(who)
    }

    /// Number of registered owners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Always `false`: an empty registry cannot be constructed. Provided
    /// because clippy expects it alongside `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The confirmation quorum.
    pub fn required_confirmations(&self) -> usize {
        self.quorum
    }

    /// Owners in insertion order.
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }
}
