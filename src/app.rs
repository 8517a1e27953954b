//! One power cycle: boot, run the three contexts, power down

use std::{future::Future, sync::Arc};

use tracing::info;

use crate::{
    config::TimerConfig,
    drivers::{AudioDriver, DisplayDriver, InputSource, PowerControl},
    error::{BootError, SleepError},
    power::{BootKind, SleepManager},
    tasks::{ControlLoop, DisplayNotifier, DisplayRefresh, PowerDownReason, TickSource},
};

/// Peripherals the timer core runs against.
///
/// Each one has a single owner at a time: the sleep manager at boot, then the
/// display task and the control loop, then the sleep manager again.
pub struct Drivers {
    pub display: Box<dyn DisplayDriver>,
    pub audio: Box<dyn AudioDriver>,
    pub input: Box<dyn InputSource>,
    pub power: Box<dyn PowerControl>,
}

/// How a power cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub boot: BootKind,
    pub reason: PowerDownReason,
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Boot(#[from] BootError),
    #[error(transparent)]
    Sleep(#[from] SleepError),
}

/// Run from boot until the device is in deep power-down.
///
/// `power_request` resolving asks for power-down from outside the timer.
pub async fn run_power_cycle<F>(
    config: TimerConfig,
    drivers: Drivers,
    power_request: F,
) -> Result<CycleOutcome, CycleError>
where
    F: Future<Output = ()>,
{
    let Drivers { mut display, mut audio, input, power } = drivers;

    let mut sleep = SleepManager::new(power, config.clone());
    let (state, boot) = sleep.boot(display.as_mut(), audio.as_mut())?;

    let notifier = Arc::new(DisplayNotifier::new());
    let refresh = DisplayRefresh::spawn(Arc::clone(&state), Arc::clone(&notifier), display);
    let ticks = TickSource::start(Arc::clone(&state), Arc::clone(&notifier), config.tick_period);

    let mut control =
        ControlLoop::new(Arc::clone(&state), Arc::clone(&notifier), input, audio, config);
    let reason = tokio::select! {
        reason = control.run() => reason,
        _ = power_request => PowerDownReason::Requested,
    };

    let mut audio = control.into_audio();
    sleep
        .enter_deep_sleep(reason, &state, ticks, refresh, audio.as_mut())
        .await?;
    info!("Power cycle ended ({:?})", reason);
    Ok(CycleOutcome { boot, reason })
}
