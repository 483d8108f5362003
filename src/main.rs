//! lightctl: LED illumination module controller.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  LineSource (stdin)        LoggingSink<StatusWriter>       │
//! │  (MessageSource)           (StatusSink → stdout)           │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ───────────────       │
//! │                                                            │
//! │   ┌────────────────────────────────────────────────────┐   │
//! │   │    Controller (dispatch · safety gating · state)   │   │
//! │   └────────────────────────────────────────────────────┘   │
//! │                          │ LightPort                       │
//! │   Lm36011<I2cdev, SysfsPin>  (/dev/i2c-1 @ 0x64, GPIO 18)  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs until stdin closes.  Set `LIGHTCTL_CONFIG` to a JSON file to
//! override defaults, `RUST_LOG` to change verbosity.
//!
//! No signal handlers are installed.  Closing stdin is the only orderly
//! stop: SIGINT or SIGTERM ends the process without parking the current,
//! releasing the select GPIO or publishing "Dead".

use std::io::{self, BufReader};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use lightctl::adapters::linux;
use lightctl::adapters::log_sink::LoggingSink;
use lightctl::adapters::stdio::{LineSource, StatusWriter};
use lightctl::app::controller::Controller;
use lightctl::config::LightConfig;

const CONFIG_ENV: &str = "LIGHTCTL_CONFIG";

fn load_config() -> Result<LightConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("{} not set, using default configuration", CONFIG_ENV);
        return Ok(LightConfig::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config = LightConfig::from_json(&text).with_context(|| format!("loading config {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("lightctl v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;

    // ── 3. Hardware bring-up (fatal on failure) ───────────────
    let module = linux::open_light_module(&config)?;
    let mut controller = match Controller::new(module, config) {
        Ok(controller) => controller,
        Err(failed) => {
            let (_bus, select) = failed.released;
            if let Err(e) = linux::release_select_pin(&select) {
                warn!("{:#}", e);
            }
            let cause = anyhow::Error::new(failed.cause);
            return Err(cause.context("LED module initialisation failed"));
        }
    };
    std::thread::sleep(Duration::from_millis(controller.config().init_settle_ms));

    // ── 4. Message bus ────────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = LineSource::spawn(BufReader::new(io::stdin()), Arc::clone(&stop))
        .context("starting message bus reader")?;
    let topic = controller.config().status_topic.clone();
    let mut sink = LoggingSink::new(StatusWriter::new(io::stdout(), topic));

    // ── 5. Control loop ───────────────────────────────────────
    controller.start(&mut sink);
    controller.run(&mut source, &mut sink, &stop);

    // ── 6. Teardown ───────────────────────────────────────────
    let (_bus, select) = controller.shutdown(&mut sink);
    if let Err(e) = linux::release_select_pin(&select) {
        warn!("{:#}", e);
    }
    info!("Light process shut down");
    Ok(())
}
