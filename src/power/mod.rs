//! Loop-interval power management
//!
//! The main loop sleeps for a configurable interval between passes. The
//! power manager keeps it at the slow (max) interval to save power and
//! drops to the fast (min) interval during warm-up and while any
//! [`IntervalLock`] is held.
//!
//! ```text
//! Uninitialized --initialize()--> Warming --first on_tick()--> Steady
//! ```
//!
//! Collaborators get a `&dyn PowerManagement` from the firmware assembly
//! and hold a lock for the duration of latency-sensitive work:
//!
//! ```ignore
//! let _lock = pm.acquire_lock("sensor_read", LockKind::NoLightSleep);
//! sensor.sample()?;
//! ```

pub mod config;
pub mod label;
pub mod lock;
pub mod registry;
pub mod service;

pub use config::{ConfigError, LockPolicy, PmConfig};
pub use label::{LABEL_CAP, LockLabel};
pub use lock::{IntervalLock, LockSink};
pub use registry::{HeldLock, LockId, MAX_LISTED_LOCKS};
pub use service::{LoopIntervalPm, PmState};

use core::fmt;

/// What the lock holder needs kept awake. The loop-interval variant
/// treats every kind the same; the kind is carried for logging and for
/// variants that scale clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    CpuFreqMax = 0,
    ApbFreqMax = 1,
    NoLightSleep = 2,
}

impl LockKind {
    pub const fn name(self) -> &'static str {
        match self {
            LockKind::CpuFreqMax => "CPU_FREQ_MAX",
            LockKind::ApbFreqMax => "APB_FREQ_MAX",
            LockKind::NoLightSleep => "NO_LIGHT_SLEEP",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Power management capability. One implementation per target family;
/// the firmware assembly picks the type.
pub trait PowerManagement {
    /// Store both extremes verbatim. Takes effect the next time either
    /// one is applied.
    fn configure(&self, min_ms: u16, max_ms: u16);

    fn min_interval_ms(&self) -> u16;

    fn max_interval_ms(&self) -> u16;

    /// Never fails.
    fn acquire_lock(&self, label: &str, kind: LockKind) -> IntervalLock<'_>;
}
