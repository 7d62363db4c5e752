//! Bus ownership between the foreground and the interrupt handler
//!
//! The foreground and the NINT interrupt handler share one SPI master. The protocol has
//! no framing beyond the instruction byte, so two interleaved transactions silently
//! corrupt each other's address and data phases instead of failing. Mutual exclusion
//! itself comes from masking the interrupt source during foreground transactions;
//! [`TransactionLock`] only detects when that guarantee has been broken.
//!
//! The check is active in debug builds on targets with atomic compare-and-swap. In
//! other builds acquiring the lock is free and never fails.

use core::sync::atomic::{AtomicBool, Ordering};

/// Exclusive ownership flag for the SPI bus
#[derive(Debug, Default)]
pub struct TransactionLock {
    busy: AtomicBool,
}

impl TransactionLock {
    /// Creates a released lock
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Marks the bus as owned until the returned guard is dropped
    ///
    /// # Panics
    /// Panics if the bus is already owned. A second owner means bus state is already
    /// corrupted, so this is treated as an unrecoverable programming error.
    pub fn acquire(&self) -> LockGuard<'_> {
        #[cfg(all(debug_assertions, target_has_atomic = "8"))]
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            panic!("tda5340: re-entrant bus transaction");
        }
        LockGuard { lock: self }
    }

    /// Whether a transaction is currently in flight
    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }
}

/// Proof of bus ownership, releases the lock on drop
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a TransactionLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}
