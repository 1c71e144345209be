// Host side of the cooperative loop
// Single core, no preemption. Components are ticked in turn, then the
// loop sleeps for the current loop interval. Whoever needs lower latency
// shortens the interval; the power manager owns that policy.

pub mod app;
pub mod component;
pub mod interval;

pub use app::{Application, MAX_COMPONENTS, RegisterError};
pub use component::{Component, SetupPriority};
pub use interval::{DEFAULT_LOOP_INTERVAL_MS, LoopInterval, LoopIntervalControl};
