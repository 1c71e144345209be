// Application: owns the component list and runs the cooperative loop.
//
// Boot: register components -> setup() (priority order, then dump_config)
// Loop: tick every component -> sleep for the current loop interval
//
// No dynamic allocation; components live in a fixed array.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use super::component::Component;
use super::interval::LoopIntervalControl;

pub const MAX_COMPONENTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// Component table is full, contains the rejected component's name
    Full(&'static str),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::Full(name) => {
                write!(f, "component table full ({}), rejected {}", MAX_COMPONENTS, name)
            }
        }
    }
}

pub struct Application<'a> {
    interval: &'a dyn LoopIntervalControl,
    components: [Option<&'a dyn Component>; MAX_COMPONENTS],
    len: usize,
    setup_done: bool,
    iterations: u32,
}

impl<'a> Application<'a> {
    pub fn new(interval: &'a dyn LoopIntervalControl) -> Self {
        Self {
            interval,
            components: [None; MAX_COMPONENTS],
            len: 0,
            setup_done: false,
            iterations: 0,
        }
    }

    pub fn register(&mut self, component: &'a dyn Component) -> Result<(), RegisterError> {
        if self.len >= MAX_COMPONENTS {
            return Err(RegisterError::Full(component.name()));
        }
        self.components[self.len] = Some(component);
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_setup(&self) -> bool {
        self.setup_done
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn loop_interval(&self) -> u16 {
        self.interval.loop_interval()
    }

    // stable insertion sort by setup priority; registration order breaks ties
    fn sort_by_priority(&mut self) {
        for i in 1..self.len {
            let mut j = i;
            while j > 0 && self.priority_at(j) < self.priority_at(j - 1) {
                self.components.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    fn priority_at(&self, idx: usize) -> Option<super::SetupPriority> {
        self.components[idx].map(|c| c.setup_priority())
    }

    fn active(&self) -> impl Iterator<Item = &'a dyn Component> + '_ {
        self.components[..self.len].iter().flatten().copied()
    }

    /// Sets up every registered component, then dumps their config.
    /// A second call is a no-op.
    pub fn setup(&mut self) {
        if self.setup_done {
            return;
        }
        self.sort_by_priority();

        info!("app: setting up {} component(s)", self.len);
        for c in self.active() {
            debug!("app: setup {} ({})", c.name(), c.setup_priority());
            c.setup();
        }
        for c in self.active() {
            c.dump_config();
        }

        self.setup_done = true;
        info!("app: setup done, loop interval {}ms", self.interval.loop_interval());
    }

    /// One pass of the main loop: tick everything, then sleep for
    /// whatever interval the components left behind.
    pub fn run_once<D: DelayNs>(&mut self, delay: &mut D) {
        if !self.setup_done {
            self.setup();
        }

        for c in self.active() {
            c.tick();
        }
        self.iterations = self.iterations.wrapping_add(1);

        delay.delay_ms(u32::from(self.interval.loop_interval()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{LoopInterval, SetupPriority};
    use core::cell::{Cell, RefCell};

    struct Recorder<'l> {
        name: &'static str,
        priority: SetupPriority,
        log: &'l RefCell<Vec<String>>,
        ticks: Cell<u32>,
    }

    impl<'l> Recorder<'l> {
        fn new(name: &'static str, priority: SetupPriority, log: &'l RefCell<Vec<String>>) -> Self {
            Self {
                name,
                priority,
                log,
                ticks: Cell::new(0),
            }
        }
    }

    impl Component for Recorder<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn setup_priority(&self) -> SetupPriority {
            self.priority
        }

        fn setup(&self) {
            self.log.borrow_mut().push(format!("setup {}", self.name));
        }

        fn tick(&self) {
            self.ticks.set(self.ticks.get() + 1);
            self.log.borrow_mut().push(format!("tick {}", self.name));
        }

        fn dump_config(&self) {
            self.log.borrow_mut().push(format!("dump {}", self.name));
        }
    }

    // sets the interval on every tick, like a component holding a lock would
    struct Slowdown<'i>(&'i dyn LoopIntervalControl, u16);

    impl Component for Slowdown<'_> {
        fn name(&self) -> &'static str {
            "slowdown"
        }

        fn tick(&self) {
            self.0.set_loop_interval(self.1);
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
        calls: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
            self.calls += 1;
        }
    }

    impl RecordingDelay {
        fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }

    #[test]
    fn setup_runs_in_priority_order_then_dumps() {
        let log = RefCell::new(Vec::new());
        let interval = LoopInterval::new(16);
        let late = Recorder::new("late", SetupPriority::Late, &log);
        let bus = Recorder::new("bus", SetupPriority::Bus, &log);
        let data_a = Recorder::new("data_a", SetupPriority::Data, &log);
        let data_b = Recorder::new("data_b", SetupPriority::Data, &log);

        let mut app = Application::new(&interval);
        app.register(&late).unwrap();
        app.register(&data_a).unwrap();
        app.register(&bus).unwrap();
        app.register(&data_b).unwrap();
        app.setup();

        assert_eq!(
            *log.borrow(),
            [
                "setup bus",
                "setup data_a",
                "setup data_b",
                "setup late",
                "dump bus",
                "dump data_a",
                "dump data_b",
                "dump late",
            ]
        );
        assert!(app.is_setup());
    }

    #[test]
    fn setup_only_runs_once() {
        let log = RefCell::new(Vec::new());
        let interval = LoopInterval::new(16);
        let c = Recorder::new("c", SetupPriority::Data, &log);

        let mut app = Application::new(&interval);
        app.register(&c).unwrap();
        app.setup();
        app.setup();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn run_once_sets_up_lazily_and_ticks_everything() {
        let log = RefCell::new(Vec::new());
        let interval = LoopInterval::new(16);
        let a = Recorder::new("a", SetupPriority::Io, &log);
        let b = Recorder::new("b", SetupPriority::Data, &log);
        let mut delay = RecordingDelay::default();

        let mut app = Application::new(&interval);
        app.register(&b).unwrap();
        app.register(&a).unwrap();
        app.run_once(&mut delay);
        app.run_once(&mut delay);

        assert_eq!(a.ticks.get(), 2);
        assert_eq!(b.ticks.get(), 2);
        assert_eq!(app.iterations(), 2);
        assert_eq!(&log.borrow()[4..], ["tick a", "tick b", "tick a", "tick b"]);
    }

    #[test]
    fn run_once_sleeps_for_the_interval_left_by_components() {
        let interval = LoopInterval::new(16);
        let slow = Slowdown(&interval, 200);
        let mut delay = RecordingDelay::default();

        let mut app = Application::new(&interval);
        app.register(&slow).unwrap();
        app.run_once(&mut delay);

        assert_eq!(app.loop_interval(), 200);
        assert_eq!(delay.total_ms(), 200);
        assert!(delay.calls > 0);
    }

    #[test]
    fn register_rejects_when_full() {
        let log = RefCell::new(Vec::new());
        let interval = LoopInterval::new(16);
        let c = Recorder::new("c", SetupPriority::Data, &log);

        let mut app = Application::new(&interval);
        for _ in 0..MAX_COMPONENTS {
            app.register(&c).unwrap();
        }
        assert_eq!(app.register(&c), Err(RegisterError::Full("c")));
        assert_eq!(app.len(), MAX_COMPONENTS);
    }
}
