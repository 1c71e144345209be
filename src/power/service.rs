// Loop-interval power manager.
//
// Polling-interval variant for targets without clock scaling: "power
// saving" means sleeping longer between main loop passes.
//
//   initialize()      -> min interval (warm-up)
//   first on_tick()   -> max interval
//   acquire_lock()    -> min interval
//   lock dropped      -> max interval (see LockPolicy)
//
// All state is Cell/RefCell; the loop is single threaded and every call
// runs to completion on it.

use core::cell::{Cell, RefCell};

use log::{Level, debug, info, log_enabled, trace, warn};

use super::config::{LockPolicy, PmConfig};
use super::label::LockLabel;
use super::lock::{IntervalLock, LockSink};
use super::registry::{HeldLock, LockId, LockRegistry, MAX_LISTED_LOCKS};
use super::{LockKind, PowerManagement};
use crate::kernel::{Component, LoopIntervalControl, SetupPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmState {
    Uninitialized,
    /// initialized, first loop pass not seen yet
    Warming,
    Steady,
}

pub struct LoopIntervalPm<'a> {
    control: &'a dyn LoopIntervalControl,
    min_ms: Cell<u16>,
    max_ms: Cell<u16>,
    policy: LockPolicy,
    state: Cell<PmState>,
    held: Cell<usize>,
    next_id: Cell<u32>,
    locks: RefCell<LockRegistry<MAX_LISTED_LOCKS>>,
}

impl<'a> LoopIntervalPm<'a> {
    pub const fn new(control: &'a dyn LoopIntervalControl, config: PmConfig) -> Self {
        Self {
            control,
            min_ms: Cell::new(config.min_loop_interval_ms),
            max_ms: Cell::new(config.max_loop_interval_ms),
            policy: config.policy,
            state: Cell::new(PmState::Uninitialized),
            held: Cell::new(0),
            next_id: Cell::new(0),
            locks: RefCell::new(LockRegistry::new()),
        }
    }

    pub fn config(&self) -> PmConfig {
        PmConfig {
            min_loop_interval_ms: self.min_ms.get(),
            max_loop_interval_ms: self.max_ms.get(),
            policy: self.policy,
        }
    }

    pub fn state(&self) -> PmState {
        self.state.get()
    }

    pub fn warmup_pending(&self) -> bool {
        self.state.get() == PmState::Warming
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Locks currently alive, including ones the registry couldn't list.
    pub fn held_locks(&self) -> usize {
        self.held.get()
    }

    /// Visits the listed locks. Works on a copy of the registry, so `f`
    /// may acquire or drop locks itself.
    pub fn for_each_held(&self, mut f: impl FnMut(&HeldLock)) {
        let locks = *self.locks.borrow();
        for lock in locks.iter() {
            f(lock);
        }
    }

    /// Enter warm-up: the loop runs at the min interval until the first
    /// tick. Calling it again restarts warm-up.
    pub fn initialize(&self) {
        let (min, max) = (self.min_ms.get(), self.max_ms.get());
        info!("pm: loop interval power management enabled");
        info!("pm: min loop interval {}ms, max {}ms", min, max);
        self.warn_if_inverted();

        self.state.set(PmState::Warming);
        self.apply(min);
    }

    /// Called once per loop pass. Only the first pass after
    /// `initialize()` does anything.
    pub fn on_tick(&self) {
        if self.state.get() != PmState::Warming {
            return;
        }
        self.state.set(PmState::Steady);

        let held = self.held.get();
        if self.policy == LockPolicy::Counted && held > 0 {
            debug!("pm: warm-up done, {} lock(s) held, staying at min", held);
            return;
        }
        debug!("pm: warm-up done");
        self.apply(self.max_ms.get());
    }

    pub fn report_status(&self) {
        info!("pm: loop interval PM enabled ({} locks)", self.policy);
        info!(
            "pm: min loop interval {}ms, max {}ms",
            self.min_ms.get(),
            self.max_ms.get()
        );
        self.warn_if_inverted();
        if log_enabled!(Level::Trace) {
            self.dump_locks();
        }
    }

    fn dump_locks(&self) {
        let locks = *self.locks.borrow();
        let held = self.held.get();
        trace!("pm: {} lock(s) held", held);
        for lock in locks.iter() {
            trace!("pm:   #{} {} ({})", lock.id.0, lock.label, lock.kind);
        }
        let unlisted = held.saturating_sub(locks.len());
        if unlisted > 0 {
            trace!("pm:   +{} unlisted", unlisted);
        }
    }

    fn warn_if_inverted(&self) {
        if let Err(e) = self.config().validate() {
            warn!("pm: {}", e);
        }
    }

    fn apply(&self, ms: u16) {
        self.control.set_loop_interval(ms);
        trace!("pm: loop interval {}ms", ms);
    }
}

impl PowerManagement for LoopIntervalPm<'_> {
    fn configure(&self, min_ms: u16, max_ms: u16) {
        self.min_ms.set(min_ms);
        self.max_ms.set(max_ms);
    }

    fn min_interval_ms(&self) -> u16 {
        self.min_ms.get()
    }

    fn max_interval_ms(&self) -> u16 {
        self.max_ms.get()
    }

    fn acquire_lock(&self, label: &str, kind: LockKind) -> IntervalLock<'_> {
        let id = LockId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        let label = LockLabel::new(label);

        self.held.set(self.held.get() + 1);
        let listed = self.locks.borrow_mut().insert(HeldLock { id, label, kind });
        if listed.is_err() {
            warn!("pm: lock registry full, {} not listed", label);
        }
        if self.state.get() == PmState::Uninitialized {
            debug!("pm: {} acquired before initialize", label);
        }

        self.apply(self.min_ms.get());
        debug!("pm: {} PM lock acquired", label);
        IntervalLock::new(self, id, label, kind)
    }
}

impl LockSink for LoopIntervalPm<'_> {
    fn release_lock(&self, lock: &IntervalLock<'_>) {
        self.locks.borrow_mut().remove(lock.id());
        let held = self.held.get().saturating_sub(1);
        self.held.set(held);

        match self.policy {
            LockPolicy::LastWriter => self.apply(self.max_ms.get()),
            // warm-up and pre-initialize keep min; on_tick restores max
            LockPolicy::Counted if held == 0 && self.state.get() == PmState::Steady => {
                self.apply(self.max_ms.get())
            }
            LockPolicy::Counted => trace!("pm: {} lock(s) still held", held),
        }
        debug!("pm: {} PM lock released", lock.label());

        if log_enabled!(Level::Trace) {
            self.report_status();
        }
    }
}

impl Component for LoopIntervalPm<'_> {
    fn name(&self) -> &'static str {
        "loop_pm"
    }

    fn setup_priority(&self) -> SetupPriority {
        SetupPriority::Bus
    }

    fn setup(&self) {
        self.initialize();
    }

    fn tick(&self) {
        self.on_tick();
    }

    fn dump_config(&self) {
        self.report_status();
    }
}
