//! # Transaction Store
//!
//! The append-only log of proposed transfers. Ids are zero-based sequence
//! numbers assigned at submission and never reused — the log is the id
//! space. Records are never deleted: executed and expired transactions
//! stay in place as the audit history.
//!
//! Read access is public; mutation is `pub(crate)` so the only writer is
//! the confirmation engine. The integrity hash stored on each record
//! exists to catch anything that violates that assumption from outside
//! the crate (see [`crate::integrity`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::address::Address;
use crate::error::EngineError;
use crate::integrity::{self, IntegrityHash};

/// Zero-based transaction sequence number.
pub type TxId = u64;

/// Derived lifecycle state of a transaction.
///
/// Not stored — computed from the terminal flags and the confirmation
/// count relative to the quorum. Storing it would create a second source
/// of truth to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Below quorum, not yet terminal.
    Pending,
    /// At or above quorum, awaiting execution.
    Confirmed,
    /// Executed successfully. Terminal.
    Executed,
    /// Expired without execution. Terminal.
    Expired,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "Pending"),
            TxStatus::Confirmed => write!(f, "Confirmed"),
            TxStatus::Executed => write!(f, "Executed"),
            TxStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// A proposed outbound transfer and its approval state.
///
/// `destination`, `value`, and `payload` are immutable once submitted and
/// are covered by `integrity_hash`. The remaining fields are the mutable
/// approval state, owned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequence number, assigned at submission.
    pub id: TxId,
    /// Transfer target. Non-zero by construction.
    pub destination: Address,
    /// Amount to transfer, in smallest units.
    pub value: u64,
    /// Opaque bytes delivered alongside the transfer. May be empty.
    pub payload: Vec<u8>,
    /// Submission timestamp; the expiry window counts from here.
    pub submitted_at: DateTime<Utc>,
    /// Owners that have confirmed and not revoked. `BTreeSet` keeps
    /// snapshot serialization deterministic.
    pub confirmed_by: BTreeSet<Address>,
    /// Set once, on successful execution.
    pub executed: bool,
    /// Set once, when the expiry window elapses unexecuted. Mutually
    /// exclusive with `executed`.
    pub expired: bool,
    /// BLAKE3 digest of (destination, value, payload) at submission time.
    pub integrity_hash: IntegrityHash,
}

impl Transaction {
    /// Distinct owner confirmations currently recorded.
    ///
    /// Derived from the set so the count can never drift from membership.
    pub fn num_confirmations(&self) -> usize {
        self.confirmed_by.len()
    }

    /// Lifecycle state relative to the given quorum.
    pub fn status(&self, quorum: usize) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.expired {
            TxStatus::Expired
        } else if self.num_confirmations() >= quorum {
            TxStatus::Confirmed
        } else {
            TxStatus::Pending
        }
    }

    /// Rejects terminal records.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyExecuted`] or [`EngineError::AlreadyExpired`].
    pub fn ensure_active(&self) -> Result<(), EngineError> {
        if self.executed {
            return Err(EngineError::AlreadyExecuted { id: self.id });
        }
        if self.expired {
            return Err(EngineError::AlreadyExpired { id: self.id });
        }
        Ok(())
    }
}

/// Read-only snapshot of a transaction, as handed to external callers.
///
/// Callers never see `&Transaction` directly — a snapshot cannot be used
/// to mutate the log, and it carries the derived status so clients do not
/// need to know the quorum to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRecord {
    /// Sequence number.
    pub id: TxId,
    /// Transfer target.
    pub destination: Address,
    /// Amount in smallest units.
    pub value: u64,
    /// Accompanying payload bytes.
    pub payload: Vec<u8>,
    /// Distinct confirmations recorded.
    pub num_confirmations: usize,
    /// Terminal flag: executed.
    pub executed: bool,
    /// Terminal flag: expired.
    pub expired: bool,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Derived lifecycle state.
    pub status: TxStatus,
}

/// Append-only transaction log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    /// Appends a new pending record and returns its id.
    ///
    /// The integrity hash is computed here, over exactly the fields being
    /// stored — there is no window in which a record exists unhashed.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDestination`] for the zero address; nothing
    /// is appended in that case.
    pub(crate) fn append(
        &mut self,
        destination: Address,
        value: u64,
        payload: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<TxId, EngineError> {
        if destination.is_zero() {
            return Err(EngineError::InvalidDestination);
        }
        let id = self.transactions.len() as TxId;
        let integrity_hash = integrity::hash_of(&destination, value, &payload);
        self.transactions.push(Transaction {
            id,
            destination,
            value,
            payload,
            submitted_at: now,
            confirmed_by: BTreeSet::new(),
            executed: false,
            expired: false,
            integrity_hash,
        });
        Ok(id)
    }

    /// Looks up a record by id.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if `id` is beyond the log.
    pub fn get(&self, id: TxId) -> Result<&Transaction, EngineError> {
        self.transactions
            .get(id as usize)
            .ok_or(EngineError::NotFound { id })
    }

    /// Mutable lookup, engine-internal only.
    pub(crate) fn get_mut(&mut self, id: TxId) -> Result<&mut Transaction, EngineError> {
        self.transactions
            .get_mut(id as usize)
            .ok_or(EngineError::NotFound { id })
    }

    /// Number of records ever appended.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True before the first submission.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
