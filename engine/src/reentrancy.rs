//! # Reentrancy Guard
//!
//! A single process-wide binary lock held for the duration of the external
//! send inside `execute`. The send hands control to arbitrary code; if that
//! code turns around and calls back into `execute` (directly or through a
//! cloned engine handle), the nested acquisition fails instead of running
//! a second execution against state the outer call has already validated.
//!
//! Release is RAII: the guard returned by [`ReentrancyLock::acquire`]
//! clears the flag on drop, so every exit path of `execute` — success,
//! error, panic unwind — releases the lock. There is deliberately no
//! manual `release()` to forget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::EngineError;

/// Process-wide binary lock around the external-call section of `execute`.
///
/// Cloning shares the underlying flag; engine handles cloned from one
/// another contend on the same lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReentrancyLock {
    held: Arc<AtomicBool>,
}

impl ReentrancyLock {
    /// Attempts to take the lock.
    ///
    /// # Errors
    ///
    /// [`EngineError::ReentrancyDetected`] if the lock is already held.
    pub fn acquire(&self) -> Result<LockGuard, EngineError> {
        // Acquire/Release pairing makes the flag a proper lock even when
        // handles are shared across threads, not just across call frames.
        if self
            .held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(EngineError::ReentrancyDetected);
        }
        Ok(LockGuard {
            held: Arc::clone(&self.held),
        })
    }
}

/// Scope token for a held [`ReentrancyLock`]. Dropping it releases the lock.
#[derive(Debug)]
pub(crate) struct LockGuard {
    held: Arc<AtomicBool>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let lock = ReentrancyLock::default();
        let guard = lock.acquire().unwrap();
        assert_eq!(lock.acquire().unwrap_err(), EngineError::ReentrancyDetected);
        drop(guard);
        assert!(lock.acquire().is_ok());
    }

    #[test]
    fn clones_share_the_flag() {
        let lock = ReentrancyLock::default();
        let other = lock.clone();
        let _guard = lock.acquire().unwrap();
        assert_eq!(other.acquire().unwrap_err(), EngineError::ReentrancyDetected);
    }

    #[test]
    fn release_runs_on_unwind() {
        let lock = ReentrancyLock::default();
        let clone = lock.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = clone.acquire().unwrap();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(lock.acquire().is_ok());
    }
}
