//! # Custodian Engine
//!
//! A shared-custody transaction authorization engine: a fixed group of
//! co-owners jointly controls a pooled balance, and any outbound transfer
//! must be proposed, confirmed by a quorum of owners, and then executed.
//! This crate is the authorization state machine and its safety guards —
//! the part of such a system where every correctness and security
//! property lives. Actual value settlement is delegated to a pluggable
//! [`Sender`]; wall-clock time to a pluggable [`Clock`].
//!
//! ## Architecture
//!
//! ```text
//! address.rs     — opaque 32-byte account identifiers
//! error.rs       — every rejection the engine can produce
//! owners.rs      — immutable owner set + confirmation quorum
//! store.rs       — append-only transaction log
//! integrity.rs   — content-hash tamper detection over stored records
//! reentrancy.rs  — RAII lock around the external-call section of execute
//! sender.rs      — external value-transfer collaborator
//! clock.rs       — time collaborator (testable expiry)
//! engine.rs      — the confirmation state machine itself
//! multicall.rs   — batch entry point with the all-must-fail guard
//! ```
//!
//! ## Design Principles
//!
//! 1. **Fail before mutating.** Every check that can reject an operation
//!    runs before the first write. A failed call leaves no trace.
//! 2. **One writer.** All mutation funnels through [`Engine`]; the store
//!    exposes no public mutators. The integrity hash on every record
//!    exists to catch whatever violates that assumption anyway.
//! 3. **Checked arithmetic on money.** The pool is credited and debited
//!    with `checked_add`/`checked_sub` — wrapping arithmetic and funds
//!    do not mix.
//! 4. **Serializable state.** The owner configuration, the transaction
//!    log, and the pool balance round-trip through [`EngineSnapshot`],
//!    so an embedding can persist the engine as a single blob.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use custodian_engine::{Address, Engine, NullSender, SystemClock};
//!
//! let owners = vec![Address([1; 32]), Address([2; 32]), Address([3; 32])];
//! let engine = Engine::new(
//!     owners.clone(),
//!     2,
//!     Arc::new(NullSender::default()),
//!     Arc::new(SystemClock),
//! )
//! .unwrap();
//! engine.deposit(1_000_000).unwrap();
//!
//! let id = engine
//!     .submit(owners[0], Address([9; 32]), 250, vec![])
//!     .unwrap();
//! engine.confirm(owners[0], id).unwrap();
//! engine.confirm(owners[1], id).unwrap();
//! engine.execute(owners[0], id).unwrap();
//!
//! assert!(engine.transaction(id).unwrap().executed);
//! assert_eq!(engine.pool_balance(), 999_750);
//! ```

pub mod address;
pub mod clock;
pub mod engine;
pub mod error;
pub mod integrity;
pub mod multicall;
pub mod owners;
mod reentrancy;
pub mod sender;
pub mod store;

pub use address::{Address, AddressParseError, ADDRESS_LEN};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Engine, EngineSnapshot, EXPIRY_WINDOW_SECS};
pub use error::{ConfigError, EngineError};
pub use integrity::IntegrityHash;
pub use multicall::Call;
pub use owners::OwnerRegistry;
pub use sender::{NullSender, SendError, Sender};
pub use store::{Transaction, TxId, TxRecord, TxStatus};
