//! Interrupt hand-off between the RTC's INT line and the main loop.
//!
//! Bus transactions block, so they must never run from an interrupt handler.
//! The handler only calls [`PollFlag::signal`]; the main loop observes the
//! request with [`PCF2129::poll_requested`](crate::PCF2129::poll_requested) and
//! does the register work there.
//!
//! # Example
//!
//! ```rust,ignore
//! static RTC_POLL: PollFlag = PollFlag::new();
//!
//! // falling-edge handler registered with the board HAL
//! fn on_rtc_int() {
//!     RTC_POLL.signal();
//! }
//!
//! let mut rtc = PCF2129::new(i2c, DEFAULT_ADDRESS).with_poll_flag(&RTC_POLL);
//! loop {
//!     if rtc.poll_requested() {
//!         let now = rtc.datetime()?;
//!     }
//! }
//! ```

use core::cell::Cell;

use critical_section::Mutex;

/// A single pending-poll flag shared with an interrupt handler.
///
/// Read-and-clear runs inside a critical section, so the flag also works on
/// cores without atomic compare-and-swap (Cortex-M0/M0+, RV32IMC). The
/// application links a `critical-section` implementation, usually through
/// its HAL.
pub struct PollFlag(Mutex<Cell<bool>>);

impl PollFlag {
    /// Creates a cleared flag, usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(false)))
    }

    /// Marks a poll as requested. Safe to call from interrupt context.
    pub fn signal(&self) {
        critical_section::with(|cs| self.0.borrow(cs).set(true));
    }

    /// Returns whether a poll was requested and clears the request.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.0.borrow(cs).replace(false))
    }

    /// Returns whether a poll is pending without clearing it.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }
}

impl core::fmt::Debug for PollFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("PollFlag").field(&self.is_pending()).finish()
    }
}

impl Default for PollFlag {
    fn default() -> Self {
        Self::new()
    }
}
