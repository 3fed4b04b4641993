//! Breathbeat firmware main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  ServoDriver (LEDC)  HeartbeatMotor (GPIO)  SerialConsole    │
//! │  SystemClock         ThreadDelay            LogEventSink     │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ContinuousRunner · TriggeredRunner · calibrate              │
//! │  BreathController · HeartbeatController · LineTrigger        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `config.mode` picks the program.  A JSON document in
//! `BREATHBEAT_CONFIG_JSON` at build time replaces the defaults.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use breathbeat::adapters::hardware::PropHardware;
use breathbeat::adapters::log_sink::LogEventSink;
use breathbeat::adapters::time::{SystemClock, ThreadDelay};
use breathbeat::app::calibration::calibrate;
use breathbeat::app::continuous::ContinuousRunner;
use breathbeat::app::ports::ClockPort;
use breathbeat::app::triggered::TriggeredRunner;
use breathbeat::config::{PropConfig, RunMode};
use breathbeat::drivers::hw_init;
use embedded_hal::delay::DelayNs;

/// Sleep period once a program has nothing left to do.
const IDLE_MS: u32 = 1000;

fn load_config() -> Result<PropConfig> {
    match option_env!("BREATHBEAT_CONFIG_JSON") {
        Some(json) => {
            let config = PropConfig::from_json(json)?;
            info!("Config loaded from BREATHBEAT_CONFIG_JSON");
            Ok(config)
        }
        None => {
            let config = PropConfig::default();
            config.validate()?;
            info!("Config: defaults");
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Breathbeat v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config and peripherals ─────────────────────────────
    let config = load_config()?;
    let hw_init::PropPeripherals {
        mut servo,
        mut motor,
        mut console,
    } = hw_init::init_peripherals(&config)?;

    let clock = SystemClock::new();
    let mut delay = ThreadDelay;
    let mut sink = LogEventSink::new(config.debug);
    info!("Mode: {:?}", config.mode);

    // ── 3. Run the selected program ───────────────────────────
    match config.mode {
        RunMode::Continuous => {
            let runner = ContinuousRunner::new(&config)?;
            runner.run(servo, &mut motor, &mut console, &clock, &mut delay, &mut sink)?;
            info!("Continuous program finished; idling");
            loop {
                delay.delay_ms(IDLE_MS);
            }
        }
        RunMode::Triggered => {
            let mut runner = TriggeredRunner::new(&config, clock.now_ms())?;
            let mut hw = PropHardware::new(servo, motor, console, clock, delay);
            runner.run(&mut hw, &mut sink)?;
            warn!("Triggered program returned without error");
            Ok(())
        }
        RunMode::Calibrate => {
            calibrate(&mut servo, config.calibration_angle, &mut sink)?;
            loop {
                delay.delay_ms(IDLE_MS);
            }
        }
    }
}
