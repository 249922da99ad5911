//! boardctl — status LED and cooling-fan controller daemon.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  TcpFeed (StatusFeed)        PiBlaster (ActuatorPort)    │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ─────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  ConnectionSupervisor · BlinkMachine · Thermal     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  orchestrator (self-test · task spawn · safe-off)        │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use log::{info, warn};

use boardctl::adapters::feed::TcpFeed;
use boardctl::adapters::pi_blaster::PiBlaster;
use boardctl::config::SystemConfig;
use boardctl::orchestrator;
use boardctl::signals::{ExitReason, request_shutdown};

const DEFAULT_CONFIG_PATH: &str = "/etc/boardctl.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("boardctl v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&parse_args());
    config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(
        "status feed {} · pwm device {}",
        config.feed_addr, config.device_path
    );

    ctrlc::set_handler(|| request_shutdown(ExitReason::Interrupt))?;

    let feed = TcpFeed::new(config.feed_addr.clone());
    let actuator = PiBlaster::new(&config);

    match orchestrator::run(&config, feed, actuator)? {
        ExitReason::Interrupt => Ok(()),
        ExitReason::ActuatorFault => Err(anyhow::anyhow!("actuator fault, see log")),
    }
}

struct Args {
    config_path: String,
    feed_addr: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: DEFAULT_CONFIG_PATH.into(),
        feed_addr: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--config" => {
                if let Some(path) = iter.next() {
                    args.config_path = path;
                }
            }
            "--addr" => args.feed_addr = iter.next(),
            other => warn!("ignoring unknown argument '{other}'"),
        }
    }
    args
}

fn load_config(args: &Args) -> SystemConfig {
    let mut config = match SystemConfig::load(&args.config_path) {
        Ok(cfg) => {
            info!("config loaded from {}", args.config_path);
            cfg
        }
        Err(e) => {
            warn!("config load failed ({e}), using defaults");
            SystemConfig::default()
        }
    };
    if let Some(addr) = &args.feed_addr {
        config.feed_addr = addr.clone();
    }
    config
}
