// loop-pm firmware entry point and main loop
//
// Boot sequence: logger -> hardware -> config -> components -> setup
// Main loop: tick components -> sleep for the current loop interval
//
// The power manager starts the loop at the fast interval, relaxes to the
// slow one after the first pass, and snaps back to fast whenever a
// component holds an interval lock (here: the sensor poller while it
// samples).

#![no_std]
#![no_main]

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use log::{debug, info, warn};
use static_cell::StaticCell;

use loop_pm::kernel::{
    Application, Component, DEFAULT_LOOP_INTERVAL_MS, LoopInterval, SetupPriority,
};
use loop_pm::power::{LockKind, LoopIntervalPm, PmConfig, PowerManagement};

esp_bootloader_esp_idf::esp_app_desc!();

// loop passes between sensor samples
const SAMPLE_EVERY_PASSES: u32 = 25;
// simulated conversion time while the lock is held
const SAMPLE_CONVERSION_MS: u32 = 5;

static LOOP_INTERVAL: LoopInterval = LoopInterval::new(DEFAULT_LOOP_INTERVAL_MS);
static PM: StaticCell<LoopIntervalPm<'static>> = StaticCell::new();
static SENSOR: StaticCell<SensorPoller<'static>> = StaticCell::new();

// Periodically samples a (simulated) sensor; holds an interval lock for
// the duration of each conversion so the loop services it promptly.
struct SensorPoller<'a> {
    pm: &'a dyn PowerManagement,
    passes: Cell<u32>,
    samples: Cell<u32>,
}

impl<'a> SensorPoller<'a> {
    fn new(pm: &'a dyn PowerManagement) -> Self {
        Self {
            pm,
            passes: Cell::new(0),
            samples: Cell::new(0),
        }
    }

    fn sample(&self) {
        let _lock = self.pm.acquire_lock("sensor_read", LockKind::NoLightSleep);
        Delay::new().delay_ms(SAMPLE_CONVERSION_MS);
        let n = self.samples.get().wrapping_add(1);
        self.samples.set(n);
        debug!("sensor: sample #{}", n);
    }
}

impl Component for SensorPoller<'_> {
    fn name(&self) -> &'static str {
        "sensor_poller"
    }

    fn setup_priority(&self) -> SetupPriority {
        SetupPriority::Data
    }

    fn tick(&self) {
        let passes = self.passes.get().wrapping_add(1);
        self.passes.set(passes);
        if passes % SAMPLE_EVERY_PASSES == 0 {
            self.sample();
        }
    }

    fn dump_config(&self) {
        info!("sensor: sampling every {} loop passes", SAMPLE_EVERY_PASSES);
    }
}

// Build-time overrides, e.g. LOOP_PM_MAX_INTERVAL_MS=500 cargo build ...
fn build_config() -> PmConfig {
    let mut cfg = PmConfig::defaults();
    let overrides = [
        ("min_loop_interval_ms", option_env!("LOOP_PM_MIN_INTERVAL_MS")),
        ("max_loop_interval_ms", option_env!("LOOP_PM_MAX_INTERVAL_MS")),
        ("lock_policy", option_env!("LOOP_PM_LOCK_POLICY")),
    ];
    for (key, val) in overrides {
        let Some(val) = val else {
            continue;
        };
        if let Err(e) = cfg.apply(key.as_bytes(), val.as_bytes()) {
            warn!("config: {}={} ignored ({})", key, val, e);
        }
    }
    cfg
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let _peripherals = esp_hal::init(config);

    info!("booting...");

    let pm: &'static LoopIntervalPm<'static> =
        PM.init(LoopIntervalPm::new(&LOOP_INTERVAL, build_config()));
    let sensor: &'static SensorPoller<'static> = SENSOR.init(SensorPoller::new(pm));

    let mut app = Application::new(&LOOP_INTERVAL);
    let components: [&'static dyn Component; 2] = [sensor, pm];
    for c in components {
        if let Err(e) = app.register(c) {
            warn!("app: {}", e);
        }
    }
    app.setup();
    info!("kernel ready.");

    let mut delay = Delay::new();
    loop {
        app.run_once(&mut delay);
    }
}
