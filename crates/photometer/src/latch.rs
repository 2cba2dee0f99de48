//! Flags raised from interrupt handlers and consumed by the main loop.
//!
//! ```rust,ignore
//! static EDGE: Latch = Latch::new();
//! static IDLE: IdleTimeout = IdleTimeout::new(20);
//!
//! #[interrupt]
//! fn INT0() {
//!     EDGE.set();
//! }
//!
//! #[interrupt]
//! fn TIMER1_COMPA() {
//!     IDLE.tick();
//! }
//! ```
use core::cell::Cell;

use critical_section::Mutex;

/// A flag set by an interrupt and test-and-cleared by the main loop.
pub struct Latch {
    raised: Mutex<Cell<bool>>,
}

impl Latch {
    pub const fn new() -> Self {
        Self {
            raised: Mutex::new(Cell::new(false)),
        }
    }

    pub fn set(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(true));
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).replace(false))
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts timer ticks and latches once `limit` of them pass without a
/// [`IdleTimeout::reset()`].
pub struct IdleTimeout {
    ticks: Mutex<Cell<u16>>,
    limit: u16,
    expired: Latch,
}

impl IdleTimeout {
    /// Seconds of inactivity before the node goes to sleep.
    pub const DEFAULT_LIMIT: u16 = 20;

    /// A `limit` of 0 never expires.
    pub const fn new(limit: u16) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
            limit,
            expired: Latch::new(),
        }
    }

    pub const fn limit(&self) -> u16 {
        self.limit
    }

    /// Count one tick. Call from the timer interrupt.
    pub fn tick(&self) {
        let expired = critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            let count = ticks.get().saturating_add(1);
            if count == self.limit {
                ticks.set(0);
                true
            } else {
                ticks.set(count);
                false
            }
        });
        if expired {
            self.expired.set();
        }
    }

    /// Start counting from zero. A timeout already latched stays latched.
    pub fn reset(&self) {
        critical_section::with(|cs| self.ticks.borrow(cs).set(0));
    }

    /// Clear the expiry, returning whether the timeout had expired.
    pub fn take_expired(&self) -> bool {
        self.expired.take()
    }
}

impl Default for IdleTimeout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod test {
    use super::{IdleTimeout, Latch};

    #[test]
    fn latch_is_taken_once() {
        static LATCH: Latch = Latch::new();
        assert!(!LATCH.take());
        LATCH.set();
        LATCH.set();
        assert!(LATCH.take());
        assert!(!LATCH.take());
    }

    #[test]
    fn timeout_expires_periodically() {
        let timeout = IdleTimeout::new(3);
        timeout.tick();
        timeout.tick();
        assert!(!timeout.take_expired());
        timeout.tick();
        assert!(timeout.take_expired());
        assert!(!timeout.take_expired());
        for _ in 0..3 {
            timeout.tick();
        }
        assert!(timeout.take_expired());
    }

    #[test]
    fn reset_restarts_count() {
        let timeout = IdleTimeout::new(2);
        timeout.tick();
        timeout.reset();
        timeout.tick();
        assert!(!timeout.take_expired());
        timeout.tick();
        assert!(timeout.take_expired());
    }

    #[test]
    fn zero_limit_never_expires() {
        let timeout = IdleTimeout::new(0);
        for _ in 0..100 {
            timeout.tick();
        }
        assert!(!timeout.take_expired());
    }
}
