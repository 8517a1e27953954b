//! Tyzr - work/break interval timer
//!
//! Host entry point: runs one power cycle against terminal drivers, with a
//! file standing in for retained memory. Type `a` + Enter to start/stop and
//! `b` + Enter to restart the phase.

use tracing::{error, info, warn};

use tyzr::{
    config::{Config, TimerConfig},
    drivers::{
        terminal::{stdin_buttons, LogAudio, TerminalDisplay},
        FilePower,
    },
    run_power_cycle,
    state::RetainedStore,
    utils::power_down_signal,
    Drivers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tyzr={}", config.log_level()))
        .init();

    info!("Starting tyzr v{}", env!("CARGO_PKG_VERSION"));
    info!("Retained region: {}", config.retained.display());

    let power = FilePower::open(RetainedStore::new(&config.retained))?;
    let drivers = Drivers {
        display: Box::new(TerminalDisplay::new()),
        audio: Box::new(LogAudio::default()),
        input: Box::new(stdin_buttons()),
        power: Box::new(power),
    };

    let power_request = async {
        if let Err(e) = power_down_signal().await {
            warn!("Signal handling unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match run_power_cycle(TimerConfig::BUILT_IN, drivers, power_request).await {
        Ok(outcome) => {
            info!(
                "Device asleep after {:?} boot ({:?}); restart to wake",
                outcome.boot, outcome.reason
            );
            // The stdin reader blocks in a read that cannot be cancelled.
            std::process::exit(0);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
