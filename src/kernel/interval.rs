// Main loop interval shared between the loop and whoever tunes it.
//
// The loop sleeps for `loop_interval()` ms after every pass. Writers are
// the power manager (and anything else holding a `&dyn
// LoopIntervalControl`). Critical section guards riscv32imc (no atomic
// RMW) and keeps the static usable from interrupt context.

use core::cell::Cell;

/// Loop interval used before anyone has tuned it.
pub const DEFAULT_LOOP_INTERVAL_MS: u16 = 16;

/// Host scheduler control consumed by the power manager.
pub trait LoopIntervalControl {
    fn set_loop_interval(&self, ms: u16);
    fn loop_interval(&self) -> u16;
}

pub struct LoopInterval {
    ms: critical_section::Mutex<Cell<u16>>,
}

impl LoopInterval {
    pub const fn new(ms: u16) -> Self {
        Self {
            ms: critical_section::Mutex::new(Cell::new(ms)),
        }
    }
}

impl Default for LoopInterval {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_INTERVAL_MS)
    }
}

impl LoopIntervalControl for LoopInterval {
    fn set_loop_interval(&self, ms: u16) {
        critical_section::with(|cs| self.ms.borrow(cs).set(ms));
    }

    fn loop_interval(&self) -> u16 {
        critical_section::with(|cs| self.ms.borrow(cs).get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SHARED: LoopInterval = LoopInterval::new(DEFAULT_LOOP_INTERVAL_MS);

    #[test]
    fn starts_at_the_constructed_value() {
        assert_eq!(LoopInterval::new(42).loop_interval(), 42);
        assert_eq!(LoopInterval::default().loop_interval(), DEFAULT_LOOP_INTERVAL_MS);
    }

    #[test]
    fn last_write_wins() {
        let interval = LoopInterval::new(1);
        interval.set_loop_interval(200);
        interval.set_loop_interval(16);
        assert_eq!(interval.loop_interval(), 16);
    }

    #[test]
    fn usable_as_a_static() {
        SHARED.set_loop_interval(500);
        assert_eq!(SHARED.loop_interval(), 500);
    }
}
