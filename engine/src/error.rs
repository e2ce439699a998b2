//! # Engine Errors
//!
//! Every rejection the engine can produce, in one place. All failures are
//! detected locally and surfaced synchronously to the caller — nothing is
//! retried internally, and no operation leaves partial state behind when
//! it fails. Every check that can fail runs before the first mutation.
//!
//! [`EngineError`] covers runtime operations; [`ConfigError`] covers
//! construction-time validation of the owner set and quorum, which is a
//! different audience (deployment tooling, not transaction callers).

use thiserror::Error;

use crate::store::TxId;

/// Errors from engine operations (submit / confirm / revoke / execute /
/// expire / multicall).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The caller is not a registered owner.
    #[error("caller is not a registered owner")]
    NotOwner,

    /// The transfer destination is the null (all-zero) identity.
    #[error("destination is the zero address")]
    InvalidDestination,

    /// No transaction exists with the given id.
    #[error("transaction {id} does not exist")]
    NotFound {
        /// The id that was requested.
        id: TxId,
    },

    /// The caller has already confirmed this transaction.
    #[error("transaction {id} already confirmed by caller")]
    AlreadyConfirmed {
        /// The transaction in question.
        id: TxId,
    },

    /// The caller tried to revoke a confirmation they never gave.
    #[error("transaction {id} not confirmed by caller")]
    NotConfirmed {
        /// The transaction in question.
        id: TxId,
    },

    /// The transaction has already been executed. Terminal state.
    #[error("transaction {id} already executed")]
    AlreadyExecuted {
        /// The transaction in question.
        id: TxId,
    },

    /// The transaction has already expired. Terminal state.
    #[error("transaction {id} already expired")]
    AlreadyExpired {
        /// The transaction in question.
        id: TxId,
    },

    /// Execution was attempted below the confirmation quorum.
    #[error("insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations {
        /// Confirmations recorded so far.
        have: usize,
        /// The required quorum.
        need: usize,
    },

    /// The stored record's integrity hash no longer matches its contents.
    ///
    /// This means something mutated the record outside the engine's API —
    /// a corrupted store or a compromised administrative write path. The
    /// record is frozen: every further state transition on it is refused.
    #[error("integrity hash mismatch on transaction {id}")]
    IntegrityViolation {
        /// The corrupted transaction.
        id: TxId,
    },

    /// A nested call into `execute` was detected while an outer execution
    /// was still in flight.
    #[error("reentrant execution detected")]
    ReentrancyDetected,

    /// The external value transfer reported failure. State is unchanged.
    #[error("execution failed: {reason}")]
    ExecutionFailed {
        /// Transport-level failure description.
        reason: String,
    },

    /// A non-empty payload was addressed to a destination that cannot
    /// accept call data (a plain account rather than a callable target).
    #[error("payload sent to non-callable destination")]
    DataToNonCallableTarget,

    /// The expiry window has not elapsed yet.
    #[error("transaction not yet expirable: {remaining_secs}s remaining")]
    NotYetExpirable {
        /// Seconds until the transaction becomes expirable.
        remaining_secs: i64,
    },

    /// A deposit would push the pooled balance past `u64::MAX`.
    #[error("deposit would overflow the pool balance")]
    DepositOverflow,

    /// A batch sub-call succeeded where the batch contract requires every
    /// sub-call to fail. All batch effects were rolled back.
    #[error("batch sub-call {index} succeeded; all sub-calls must fail")]
    BatchIntegrityViolation {
        /// Zero-based position of the offending sub-call.
        index: usize,
    },
}

/// Errors from constructing or restoring an engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The owner list was empty.
    #[error("owner set must not be empty")]
    NoOwners,

    /// The owner list contained the same address twice.
    #[error("duplicate owner in owner set")]
    DuplicateOwner,

    /// The owner list contained the null identity.
    #[error("zero address cannot be an owner")]
    ZeroOwner,

    /// The quorum was zero or exceeded the owner count.
    #[error("quorum {quorum} out of range for {owners} owners")]
    BadQuorum {
        /// The requested quorum.
        quorum: usize,
        /// Number of owners supplied.
        owners: usize,
    },
}
