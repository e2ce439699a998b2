//! # Confirmation Engine
//!
//! The state machine at the center of the crate. Every mutation of the
//! transaction log and the pooled balance is funneled through [`Engine`]:
//! it consults the [`OwnerRegistry`](crate::owners::OwnerRegistry) for
//! authorization, the store for state, the integrity guard before acting
//! on any record, and the reentrancy lock around the external send.
//!
//! ## Lifecycle
//!
//! ```text
//! submit ──> Pending ──confirm──> Confirmed ──execute──> Executed
//!               │  ^──revoke────────┘ │
//!               └──────expire─────────┴────────────────> Expired
//! ```
//!
//! `Executed` and `Expired` are terminal and mutually exclusive; once a
//! record reaches either, every further transition on it is refused.
//!
//! ## Atomicity
//!
//! Operations are all-or-nothing. Every check that can fail runs before
//! the first mutation, so a failed call leaves no trace beyond a log line.
//! The one genuinely delicate path is `execute`, where an external send
//! sits in the middle of the operation — see the phase comments there.
//!
//! ## Handles
//!
//! `Engine` is a cheap clone over shared inner state. That is not a
//! convenience: the external send is arbitrary code and may legally hold
//! its own handle (that is exactly the shape of a reentrancy attack, and
//! exactly what the reentrancy lock is there to stop).

use chrono::Duration;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::clock::Clock;
use crate::error::{ConfigError, EngineError};
use crate::integrity;
use crate::owners::OwnerRegistry;
use crate::reentrancy::ReentrancyLock;
use crate::sender::Sender;
use crate::store::{Transaction, TransactionStore, TxId, TxRecord};

/// Window after submission in which a transaction must execute before it
/// becomes expirable. Fixed for the engine's lifetime.
pub const EXPIRY_WINDOW_SECS: i64 = 24 * 60 * 60;

/// The mutable half of the engine: the transaction log plus the pooled
/// balance. Kept in one struct so a multicall rollback is a single
/// clone-and-restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EngineState {
    pub(crate) store: TransactionStore,
    pub(crate) pool: u64,
}

pub(crate) struct Inner {
    pub(crate) registry: OwnerRegistry,
    pub(crate) state: Mutex<EngineState>,
    pub(crate) lock: ReentrancyLock,
    pub(crate) sender: Arc<dyn Sender>,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Serializable snapshot of the engine's durable state: the owner/quorum
/// configuration, the full transaction log, and the pooled balance.
///
/// This is everything that must survive a restart. The sender and clock
/// are collaborators, not state, and are supplied again on
/// [`Engine::restore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Owner set and quorum.
    pub registry: OwnerRegistry,
    /// The append-only transaction log.
    pub store: TransactionStore,
    /// Undistributed pooled funds, in smallest units.
    pub pool_balance: u64,
}

/// Shared-custody transaction authorization engine.
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<Inner>,
}

impl Engine {
    /// Builds an engine over a fresh, empty log.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the owner set or quorum is invalid.
    pub fn new(
        owners: Vec<Address>,
        quorum: usize,
        sender: Arc<dyn Sender>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let registry = OwnerRegistry::new(owners, quorum)?;
        info!(
            owners = registry.len(),
            quorum = registry.required_confirmations(),
            "engine initialized"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                state: Mutex::new(EngineState {
                    store: TransactionStore::default(),
                    pool: 0,
                }),
                lock: ReentrancyLock::default(),
                sender,
                clock,
            }),
        })
    }

    /// Rebuilds an engine from a [`EngineSnapshot`], typically after a
    /// restart. The snapshot's registry is re-validated — a snapshot is
    /// just bytes and bytes can lie.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the snapshot's owner configuration is invalid.
    pub fn restore(
        snapshot: EngineSnapshot,
        sender: Arc<dyn Sender>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let registry = OwnerRegistry::new(
            snapshot.registry.owners().to_vec(),
            snapshot.registry.required_confirmations(),
        )?;
        info!(
            owners = registry.len(),
            transactions = snapshot.store.len(),
            "engine restored from snapshot"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                state: Mutex::new(EngineState {
                    store: snapshot.store,
                    pool: snapshot.pool_balance,
                }),
                lock: ReentrancyLock::default(),
                sender,
                clock,
            }),
        })
    }

    /// Captures the durable state for persistence.
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.inner.state.lock();
        EngineSnapshot {
            registry: self.inner.registry.clone(),
            store: state.store.clone(),
            pool_balance: state.pool,
        }
    }

    // -----------------------------------------------------------------
    // Pool
    // -----------------------------------------------------------------

    /// Credits the pooled balance. This is the funding path — anyone may
    /// pay in.
    ///
    /// # Errors
    ///
    /// [`EngineError::DepositOverflow`] if the pool would exceed `u64`.
    pub fn deposit(&self, amount: u64) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock();
        state.pool = state
            .pool
            .checked_add(amount)
            .ok_or(EngineError::DepositOverflow)?;
        debug!(amount, pool = state.pool, "deposit credited");
        Ok(())
    }

    /// Undistributed pooled funds, in smallest units.
    pub fn pool_balance(&self) -> u64 {
        self.inner.state.lock().pool
    }

    // -----------------------------------------------------------------
    // Proposal lifecycle
    // -----------------------------------------------------------------

    /// Proposes an outbound transfer. The record starts `Pending` with no
    /// confirmations — submitting does not imply confirming.
    ///
    /// Returns the new id, which always equals the prior transaction
    /// count.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotOwner`], or [`EngineError::InvalidDestination`]
    /// for the zero address (nothing is appended in that case).
    pub fn submit(
        &self,
        caller: Address,
        destination: Address,
        value: u64,
        payload: Vec<u8>,
    ) -> Result<TxId, EngineError> {
        self.require_owner(&caller)?;
        let mut state = self.inner.state.lock();
        let now = self.inner.clock.now();
        let id = state.store.append(destination, value, payload, now)?;
        info!(tx_id = id, caller = %caller, dest = %destination, value, "transaction submitted");
        Ok(id)
    }

    /// Records the caller's confirmation on a pending or confirmed
    /// transaction.
    ///
    /// # Errors
    ///
    /// In check order: [`EngineError::NotOwner`],
    /// [`EngineError::NotFound`], [`EngineError::AlreadyExecuted`] /
    /// [`EngineError::AlreadyExpired`],
    /// [`EngineError::IntegrityViolation`],
    /// [`EngineError::AlreadyConfirmed`].
    pub fn confirm(&self, caller: Address, id: TxId) -> Result<(), EngineError> {
        self.require_owner(&caller)?;
        let mut state = self.inner.state.lock();
        let quorum = self.inner.registry.required_confirmations();
        let tx = state.store.get_mut(id)?;
        tx.ensure_active()?;
        Self::verify_integrity(tx)?;
        if !tx.confirmed_by.insert(caller) {
            return Err(EngineError::AlreadyConfirmed { id });
        }
        info!(
            tx_id = id,
            caller = %caller,
            confirmations = tx.num_confirmations(),
            quorum,
            "confirmation recorded"
        );
        Ok(())
    }

    /// Withdraws the caller's prior confirmation. Legal any time before
    /// the record goes terminal — a revoke may drop a confirmed
    /// transaction back below quorum.
    ///
    /// # Errors
    ///
    /// Existence and terminal checks as for [`Engine::confirm`], then
    /// [`EngineError::NotConfirmed`] if the caller never confirmed.
    pub fn revoke(&self, caller: Address, id: TxId) -> Result<(), EngineError> {
        self.require_owner(&caller)?;
        let mut state = self.inner.state.lock();
        let tx = state.store.get_mut(id)?;
        tx.ensure_active()?;
        if !tx.confirmed_by.remove(&caller) {
            return Err(EngineError::NotConfirmed { id });
        }
        info!(
            tx_id = id,
            caller = %caller,
            confirmations = tx.num_confirmations(),
            "confirmation revoked"
        );
        Ok(())
    }

    /// Executes a confirmed transaction: verifies quorum and integrity,
    /// takes the reentrancy lock, invokes the external send, and on
    /// success marks the record executed and debits the pool by exactly
    /// `value`.
    ///
    /// # Errors
    ///
    /// In check order: [`EngineError::NotOwner`],
    /// [`EngineError::NotFound`], terminal checks,
    /// [`EngineError::InsufficientConfirmations`],
    /// [`EngineError::IntegrityViolation`],
    /// [`EngineError::DataToNonCallableTarget`],
    /// [`EngineError::ExecutionFailed`] (pool too small, or the send
    /// itself failed — state unchanged either way),
    /// [`EngineError::ReentrancyDetected`] if another execution is in
    /// flight, and [`EngineError::AlreadyExpired`] if the record was
    /// retired while the send ran (the commit refuses; the delivered
    /// transfer is a reconciliation event for the embedder).
    pub fn execute(&self, caller: Address, id: TxId) -> Result<(), EngineError> {
        self.require_owner(&caller)?;

        // Phase 1 — validate under the state lock, copy out the transfer,
        // and take the reentrancy lock while still holding the mutex so
        // no other execution can slip between validation and send.
        let (destination, value, payload, _guard) = {
            let state = self.inner.state.lock();
            let tx = state.store.get(id)?;
            tx.ensure_active()?;
            let have = tx.num_confirmations();
            let need = self.inner.registry.required_confirmations();
            if have < need {
                return Err(EngineError::InsufficientConfirmations { have, need });
            }
            Self::verify_integrity(tx)?;
            if !tx.payload.is_empty() && !self.inner.sender.is_callable(&tx.destination) {
                return Err(EngineError::DataToNonCallableTarget);
            }
            if tx.value > state.pool {
                return Err(EngineError::ExecutionFailed {
                    reason: format!(
                        "pool balance {} below transfer value {}",
                        state.pool, tx.value
                    ),
                });
            }
            let guard = self.inner.lock.acquire()?;
            (tx.destination, tx.value, tx.payload.clone(), guard)
        };

        // Phase 2 — the external call. The state mutex is released: the
        // send is arbitrary code and may call back into the engine. Reads
        // and confirms go through; a nested execute hits the reentrancy
        // lock still held by `_guard`.
        if let Err(e) = self.inner.sender.send(&destination, value, &payload) {
            warn!(tx_id = id, reason = %e.reason, "external send failed");
            return Err(EngineError::ExecutionFailed { reason: e.reason });
        }

        // Phase 3 — commit. The reentrancy lock was held across the send,
        // so no other execution can have touched this record or debited
        // the pool since phase 1. Expire takes neither lock, though: once
        // the 24h window has elapsed, anyone — the send itself included —
        // can retire the record mid-flight, and the terminal flags must
        // stay mutually exclusive.
        let mut state = self.inner.state.lock();
        let new_pool = state.pool.checked_sub(value).ok_or_else(|| {
            EngineError::ExecutionFailed {
                reason: "pool underflow on commit".into(),
            }
        })?;
        {
            let tx = state.store.get_mut(id)?;
            if let Err(e) = tx.ensure_active() {
                warn!(
                    tx_id = id,
                    "record went terminal during send; delivered transfer needs reconciliation"
                );
                return Err(e);
            }
            tx.executed = true;
        }
        state.pool = new_pool;
        info!(tx_id = id, caller = %caller, dest = %destination, value, "transaction executed");
        Ok(())
    }

    /// Records that a transaction's 24-hour execution window elapsed.
    ///
    /// Deliberately open to any caller, owner or not: it only records a
    /// timeout fact that is already true.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`], terminal checks, then
    /// [`EngineError::NotYetExpirable`] while the window is still open.
    pub fn expire(&self, id: TxId) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock();
        let now = self.inner.clock.now();
        let tx = state.store.get_mut(id)?;
        tx.ensure_active()?;
        let age = now - tx.submitted_at;
        let window = Duration::seconds(EXPIRY_WINDOW_SECS);
        if age < window {
            return Err(EngineError::NotYetExpirable {
                remaining_secs: (window - age).num_seconds(),
            });
        }
        tx.expired = true;
        info!(tx_id = id, "transaction expired");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Snapshot of a single transaction.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown id.
    pub fn transaction(&self, id: TxId) -> Result<TxRecord, EngineError> {
        let state = self.inner.state.lock();
        let tx = state.store.get(id)?;
        Ok(TxRecord {
            id: tx.id,
            destination: tx.destination,
            value: tx.value,
            payload: tx.payload.clone(),
            num_confirmations: tx.num_confirmations(),
            executed: tx.executed,
            expired: tx.expired,
            submitted_at: tx.submitted_at,
            status: tx.status(self.inner.registry.required_confirmations()),
        })
    }

    /// The owner set, in registration order.
    pub fn owners(&self) -> Vec<Address> {
        self.inner.registry.owners().to_vec()
    }

    /// The confirmation quorum.
    pub fn required_confirmations(&self) -> usize {
        self.inner.registry.required_confirmations()
    }

    /// Number of transactions ever submitted.
    pub fn transaction_count(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    pub(crate) fn require_owner(&self, caller: &Address) -> Result<(), EngineError> {
        if !self.inner.registry.is_owner(caller) {
            return Err(EngineError::NotOwner);
        }
        Ok(())
    }

    fn verify_integrity(tx: &Transaction) -> Result<(), EngineError> {
        integrity::verify(tx).map_err(|e| {
            warn!(tx_id = tx.id, "integrity hash mismatch, record frozen");
            e
        })
    }

    /// Corruption-injection hook: mutates a stored record **without**
    /// recomputing its integrity hash, exactly like a buggy or hostile
    /// write path that bypasses the engine. Exists so integration tests
    /// and recovery drills can exercise the integrity guard. Never call
    /// this from production code.
    #[doc(hidden)]
    pub fn tamper_with(
        &self,
        id: TxId,
        mutate: impl FnOnce(&mut Transaction),
    ) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock();
        mutate(state.store.get_mut(id)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_LEN;
    use crate::clock::ManualClock;
    use crate::sender::NullSender;

    fn addr(tag: u8) -> Address {
        Address([tag; ADDRESS_LEN])
    }

    fn engine_2_of_3() -> (Engine, ManualClock) {
        let clock = ManualClock::default();
        let engine = Engine::new(
            vec![addr(1), addr(2), addr(3)],
            2,
            Arc::new(NullSender::default()),
            Arc::new(clock.clone()),
        )
        .unwrap();
        engine.deposit(1_000_000).unwrap();
        (engine, clock)
    }

    #[test]
    fn submit_assigns_prior_count_as_id() {
        let (engine, _) = engine_2_of_3();
        assert_eq!(engine.transaction_count(), 0);
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        assert_eq!(id, 0);
        assert_eq!(engine.transaction_count(), 1);
        let id = engine.submit(addr(2), addr(9), 100, vec![]).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn submit_requires_owner() {
        let (engine, _) = engine_2_of_3();
        assert_eq!(
            engine.submit(addr(9), addr(5), 1, vec![]).unwrap_err(),
            EngineError::NotOwner
        );
    }

    #[test]
    fn submit_rejects_zero_destination_without_creating_record() {
        let (engine, _) = engine_2_of_3();
        assert_eq!(
            engine.submit(addr(1), Address::ZERO, 1, vec![]).unwrap_err(),
            EngineError::InvalidDestination
        );
        assert_eq!(engine.transaction_count(), 0);
    }

    #[test]
    fn confirm_then_revoke_restores_count() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(2), id).unwrap();
        assert_eq!(engine.transaction(id).unwrap().num_confirmations, 1);
        engine.revoke(addr(2), id).unwrap();
        assert_eq!(engine.transaction(id).unwrap().num_confirmations, 0);
    }

    #[test]
    fn double_confirm_rejected() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(2), id).unwrap();
        assert_eq!(
            engine.confirm(addr(2), id).unwrap_err(),
            EngineError::AlreadyConfirmed { id }
        );
        assert_eq!(engine.transaction(id).unwrap().num_confirmations, 1);
    }

    #[test]
    fn revoke_without_confirmation_rejected() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        assert_eq!(
            engine.revoke(addr(1), id).unwrap_err(),
            EngineError::NotConfirmed { id }
        );
    }

    #[test]
    fn confirm_unknown_id_not_found() {
        let (engine, _) = engine_2_of_3();
        assert_eq!(
            engine.confirm(addr(1), 999).unwrap_err(),
            EngineError::NotFound { id: 999 }
        );
    }

    #[test]
    fn execute_below_quorum_rejected() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        assert_eq!(
            engine.execute(addr(1), id).unwrap_err(),
            EngineError::InsufficientConfirmations { have: 1, need: 2 }
        );
    }

    #[test]
    fn execute_at_quorum_debits_pool_and_goes_terminal() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 250, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        engine.execute(addr(1), id).unwrap();

        let tx = engine.transaction(id).unwrap();
        assert!(tx.executed);
        assert_eq!(tx.status, crate::store::TxStatus::Executed);
        assert_eq!(engine.pool_balance(), 1_000_000 - 250);
    }

    #[test]
    fn double_execute_rejected() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        engine.execute(addr(1), id).unwrap();
        assert_eq!(
            engine.execute(addr(2), id).unwrap_err(),
            EngineError::AlreadyExecuted { id }
        );
        // Pool debited exactly once.
        assert_eq!(engine.pool_balance(), 1_000_000 - 100);
    }

    #[test]
    fn revoke_below_quorum_blocks_execution() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        engine.revoke(addr(1), id).unwrap();
        assert_eq!(
            engine.execute(addr(2), id).unwrap_err(),
            EngineError::InsufficientConfirmations { have: 1, need: 2 }
        );
    }

    #[test]
    fn execute_with_insufficient_pool_fails_cleanly() {
        let (engine, _) = engine_2_of_3();
        let id = engine
            .submit(addr(1), addr(9), 2_000_000, vec![])
            .unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        let err = engine.execute(addr(1), id).unwrap_err();
        assert!(matches!(err, EngineError::ExecutionFailed { .. }));
        let tx = engine.transaction(id).unwrap();
        assert!(!tx.executed);
        assert_eq!(engine.pool_balance(), 1_000_000);
    }

    #[test]
    fn payload_to_non_callable_destination_rejected() {
        let (engine, _) = engine_2_of_3();
        // NullSender::default() reports every destination non-callable.
        let id = engine
            .submit(addr(1), addr(9), 0, vec![0xde, 0xad])
            .unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        assert_eq!(
            engine.execute(addr(1), id).unwrap_err(),
            EngineError::DataToNonCallableTarget
        );
        assert!(!engine.transaction(id).unwrap().executed);
    }

    #[test]
    fn payload_to_callable_destination_accepted() {
        let clock = ManualClock::default();
        let engine = Engine::new(
            vec![addr(1), addr(2)],
            2,
            Arc::new(NullSender { callable: true }),
            Arc::new(clock),
        )
        .unwrap();
        engine.deposit(100).unwrap();
        let id = engine.submit(addr(1), addr(9), 1, vec![0x01]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        engine.execute(addr(1), id).unwrap();
        assert!(engine.transaction(id).unwrap().executed);
    }

    #[test]
    fn expire_before_window_rejected() {
        let (engine, clock) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        clock.advance(Duration::hours(23));
        assert!(matches!(
            engine.expire(id).unwrap_err(),
            EngineError::NotYetExpirable { .. }
        ));
    }

    #[test]
    fn expire_after_window_by_non_owner() {
        let (engine, clock) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        clock.advance(Duration::hours(48));
        // Expire is open to anyone, so no caller argument to gate.
        engine.expire(id).unwrap();
        let tx = engine.transaction(id).unwrap();
        assert!(tx.expired);
        assert_eq!(tx.status, crate::store::TxStatus::Expired);
    }

    #[test]
    fn expired_transaction_refuses_everything() {
        let (engine, clock) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        clock.advance(Duration::hours(25));
        engine.expire(id).unwrap();

        let expired = EngineError::AlreadyExpired { id };
        assert_eq!(engine.confirm(addr(3), id).unwrap_err(), expired);
        assert_eq!(
            engine.revoke(addr(1), id).unwrap_err(),
            EngineError::AlreadyExpired { id }
        );
        assert_eq!(
            engine.execute(addr(1), id).unwrap_err(),
            EngineError::AlreadyExpired { id }
        );
        assert_eq!(
            engine.expire(id).unwrap_err(),
            EngineError::AlreadyExpired { id }
        );
    }

    #[test]
    fn executed_transaction_cannot_expire() {
        let (engine, clock) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();
        engine.execute(addr(1), id).unwrap();
        clock.advance(Duration::hours(48));
        assert_eq!(
            engine.expire(id).unwrap_err(),
            EngineError::AlreadyExecuted { id }
        );
    }

    #[test]
    fn tampered_record_freezes_on_confirm_and_execute() {
        let (engine, _) = engine_2_of_3();
        let id = engine.submit(addr(1), addr(9), 100, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();
        engine.confirm(addr(2), id).unwrap();

        engine.tamper_with(id, |tx| tx.value = 999_999).unwrap();

        assert_eq!(
            engine.confirm(addr(3), id).unwrap_err(),
            EngineError::IntegrityViolation { id }
        );
        assert_eq!(
            engine.execute(addr(1), id).unwrap_err(),
            EngineError::IntegrityViolation { id }
        );
        assert_eq!(engine.pool_balance(), 1_000_000);
    }

    #[test]
    fn deposit_overflow_rejected() {
        let (engine, _) = engine_2_of_3();
        assert_eq!(
            engine.deposit(u64::MAX).unwrap_err(),
            EngineError::DepositOverflow
        );
        assert_eq!(engine.pool_balance(), 1_000_000);
    }

    #[test]
    fn snapshot_round_trip_preserves_everything() {
        let (engine, clock) = engine_2_of_3();
        // Empty payload: the restored engine re-executes through a
        // NullSender that reports every destination non-callable.
        let id = engine.submit(addr(1), addr(9), 400, vec![]).unwrap();
        engine.confirm(addr(1), id).unwrap();

        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        let snapshot: EngineSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Engine::restore(
            snapshot,
            Arc::new(NullSender::default()),
            Arc::new(clock),
        )
        .unwrap();

        assert_eq!(restored.pool_balance(), 1_000_000);
        assert_eq!(restored.transaction_count(), 1);
        let tx = restored.transaction(id).unwrap();
        assert_eq!(tx.num_confirmations, 1);
        assert_eq!(tx.value, 400);
        // Confirmations survive: the second one tips quorum.
        restored.confirm(addr(2), id).unwrap();
        restored.execute(addr(1), id).unwrap();
        assert_eq!(restored.pool_balance(), 1_000_000 - 400);
    }
}
