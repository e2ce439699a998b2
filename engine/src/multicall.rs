//! # Batch-Call Guard
//!
//! An independent entry point that runs a caller-supplied batch of
//! sub-calls against the engine, with an inverted acceptance rule: the
//! batch is accepted only if **every** sub-call fails. The moment any
//! sub-call succeeds — and reads always succeed — the whole batch is
//! rejected with `BatchIntegrityViolation` and every state effect of the
//! batch is rolled back.
//!
//! This all-must-fail contract is unusual, and intentional. The
//! observable effect is that the generic batch entry point can never be
//! used to smuggle in an operation that should have gone through its
//! dedicated single-purpose path: anything that would have worked trips
//! the guard. Treat it as an anti-abuse control; callers who want an
//! operation to happen have exactly one way to do it, the dedicated
//! method.
//!
//! ## Rollback and the external send
//!
//! Sub-call failures never mutate state, so an accepted batch is a no-op
//! by construction. A rejected batch restores the pre-batch engine state
//! wholesale. The one effect that cannot be unwound is an external send
//! performed by an `Execute` sub-call that succeeded before the guard
//! tripped — the engine's own books are restored, but the transfer
//! primitive has already run. Embedders who wire a real settlement rail
//! into [`Sender`](crate::sender::Sender) should treat a
//! `BatchIntegrityViolation` after an `Execute` sub-call as a
//! reconciliation event.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::Address;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::store::TxId;

/// One sub-call in a batch: every engine entry point, reads included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Propose a transfer.
    Submit {
        /// Transfer target.
        destination: Address,
        /// Amount in smallest units.
        value: u64,
        /// Accompanying payload bytes.
        payload: Vec<u8>,
    },
    /// Confirm a transaction as the batch caller.
    Confirm {
        /// Target transaction.
        id: TxId,
    },
    /// Revoke the batch caller's confirmation.
    Revoke {
        /// Target transaction.
        id: TxId,
    },
    /// Execute a confirmed transaction.
    Execute {
        /// Target transaction.
        id: TxId,
    },
    /// Record expiry of a transaction.
    Expire {
        /// Target transaction.
        id: TxId,
    },
    /// Read the owner set. Always succeeds, so its presence always trips
    /// the guard.
    GetOwners,
    /// Read a transaction snapshot.
    GetTransaction {
        /// Target transaction.
        id: TxId,
    },
    /// Read the transaction count. Always succeeds.
    GetTransactionCount,
}

impl Engine {
    /// Runs a batch of sub-calls, accepting it only if every sub-call
    /// fails.
    ///
    /// Sub-calls execute in order, each with `caller` as its caller and
    /// its usual authorization rules. The batch itself is open to any
    /// caller — a non-owner simply guarantees that the owner-gated
    /// sub-calls fail, which is the accepting direction of the contract.
    ///
    /// # Errors
    ///
    /// [`EngineError::BatchIntegrityViolation`] naming the first
    /// succeeding sub-call; all engine state effects of the batch are
    /// rolled back before returning.
    pub fn multicall(&self, caller: Address, calls: &[Call]) -> Result<(), EngineError> {
        let checkpoint = self.inner.state.lock().clone();

        for (index, call) in calls.iter().enumerate() {
            if self.apply(caller, call).is_ok() {
                *self.inner.state.lock() = checkpoint;
                warn!(index, caller = %caller, "batch sub-call succeeded, batch rejected");
                return Err(EngineError::BatchIntegrityViolation { index });
            }
        }
        Ok(())
    }

    /// Dispatches one sub-call. Success/failure is all the guard needs,
    /// so results are erased to `()`.
    fn apply(&self, caller: Address, call: &Call) -> Result<(), EngineError> {
        match call {
            Call::Submit {
                destination,
                value,
                payload,
            } => self
                .submit(caller, *destination, *value, payload.clone())
                .map(|_| ()),
            Call::Confirm { id } => self.confirm(caller, *id),
            Call::Revoke { id } => self.revoke(caller, *id),
            Call::Execute { id } => self.execute(caller, *id),
            Call::Expire { id } => self.expire(*id),
            Call::GetOwners => {
                let _ = self.owners();
                Ok(())
            }
            Call::GetTransaction { id } => self.transaction(*id).map(|_| ()),
            Call::GetTransactionCount => {
                let _ = self.transaction_count();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_LEN;
    use crate::clock::ManualClock;
    use crate::sender::NullSender;
    use std::sync::Arc;

    fn addr(tag: u8) -> Address {
        Address([tag; ADDRESS_LEN])
    }

    fn engine() -> Engine {
        let e = Engine::new(
            vec![addr(1), addr(2), addr(3)],
            2,
            Arc::new(NullSender::default()),
            Arc::new(ManualClock::default()),
        )
        .unwrap();
        e.deposit(1_000).unwrap();
        e
    }

    #[test]
    fn batch_with_a_read_is_rejected() {
        let e = engine();
        let err = e.multicall(addr(1), &[Call::GetOwners]).unwrap_err();
        assert_eq!(err, EngineError::BatchIntegrityViolation { index: 0 });
    }

    #[test]
    fn batch_where_every_call_fails_is_accepted() {
        let e = engine();
        e.multicall(
            addr(1),
            &[
                // Unknown id, zero destination, revoke-without-confirm:
                // all guaranteed failures.
                Call::Confirm { id: 777 },
                Call::Submit {
                    destination: Address::ZERO,
                    value: 1,
                    payload: vec![],
                },
                Call::Expire { id: 777 },
            ],
        )
        .unwrap();
        assert_eq!(e.transaction_count(), 0);
    }

    #[test]
    fn succeeding_mutation_is_rolled_back() {
        let e = engine();
        // The submit at index 1 would succeed, so the batch must fail and
        // the submitted record must vanish.
        let err = e
            .multicall(
                addr(1),
                &[
                    Call::Confirm { id: 42 },
                    Call::Submit {
                        destination: addr(9),
                        value: 5,
                        payload: vec![],
                    },
                ],
            )
            .unwrap_err();
        assert_eq!(err, EngineError::BatchIntegrityViolation { index: 1 });
        assert_eq!(e.transaction_count(), 0);
    }

    #[test]
    fn partial_effects_before_the_violation_are_rolled_back() {
        let e = engine();
        let id = e.submit(addr(1), addr(9), 10, vec![]).unwrap();

        // Index 0 fails (double-expire-style NotYetExpirable), index 1
        // succeeds (a fresh confirmation) and must be undone.
        let err = e
            .multicall(addr(2), &[Call::Expire { id }, Call::Confirm { id }])
            .unwrap_err();
        assert_eq!(err, EngineError::BatchIntegrityViolation { index: 1 });
        assert_eq!(e.transaction(id).unwrap().num_confirmations, 0);
    }

    #[test]
    fn non_owner_batch_of_gated_calls_is_accepted() {
        let e = engine();
        let id = e.submit(addr(1), addr(9), 10, vec![]).unwrap();
        // Every owner-gated sub-call fails NotOwner for addr(9), which is
        // exactly the accepting direction of the contract.
        e.multicall(
            addr(9),
            &[
                Call::Confirm { id },
                Call::Revoke { id },
                Call::Execute { id },
            ],
        )
        .unwrap();
        assert_eq!(e.transaction(id).unwrap().num_confirmations, 0);
    }

    #[test]
    fn empty_batch_is_vacuously_accepted() {
        let e = engine();
        e.multicall(addr(1), &[]).unwrap();
    }
}
