//! # Value-Transfer Collaborator
//!
//! The engine never moves funds itself — it delegates to a [`Sender`], the
//! opaque transfer primitive at the system boundary. A production embedding
//! wires in whatever actually settles value (a ledger write, a payment
//! rail, an RPC to a chain node); tests wire in instrumented fakes,
//! including hostile ones that re-enter the engine mid-send.
//!
//! The engine treats the sender as all-or-nothing: a send either fully
//! succeeds or reports failure, and on failure the engine leaves its own
//! state untouched.

use thiserror::Error;

use crate::address::Address;

/// Failure reported by the external transfer primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("send failed: {reason}")]
pub struct SendError {
    /// Transport-level description. Surfaced verbatim inside
    /// [`crate::EngineError::ExecutionFailed`].
    pub reason: String,
}

impl SendError {
    /// Convenience constructor.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External value-transfer primitive consumed by `execute`.
pub trait Sender: Send + Sync {
    /// Delivers `value` (and `payload`, if any) to `destination`.
    ///
    /// # Errors
    ///
    /// Any [`SendError`] aborts the execution with no engine-side state
    /// change.
    fn send(&self, destination: &Address, value: u64, payload: &[u8]) -> Result<(), SendError>;

    /// Whether `destination` can accept a non-empty payload.
    ///
    /// Plain value-holding accounts cannot; delivering call data to one
    /// would silently discard it, so the engine rejects the execution
    /// up front instead.
    fn is_callable(&self, destination: &Address) -> bool;
}

/// A sender that accepts every transfer and delivers nothing.
///
/// Useful for embeddings where settlement happens elsewhere, and as the
/// base case in tests. `callable` controls the [`Sender::is_callable`]
/// answer for every destination.
#[derive(Debug, Clone)]
pub struct NullSender {
    /// Blanket answer for `is_callable`.
    pub callable: bool,
}

impl Default for NullSender {
    fn default() -> Self {
        // Most destinations in practice are plain accounts.
        Self { callable: false }
    }
}

impl Sender for NullSender {
    fn send(&self, _destination: &Address, _value: u64, _payload: &[u8]) -> Result<(), SendError> {
        Ok(())
    }

    fn is_callable(&self, _destination: &Address) -> bool {
        self.callable
    }
}
