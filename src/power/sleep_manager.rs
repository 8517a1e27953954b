//! Entry into and exit from deep power-down

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::TimerConfig,
    drivers::{AudioDriver, DisplayDriver, PowerControl},
    error::{BootError, SleepError},
    state::{PersistentState, RetainedImage},
    tasks::{render_current, DisplayRefresh, PowerDownReason, TickSource},
};

/// How the current power cycle began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootKind {
    ColdStart,
    Resume,
}

/// Owns the power subsystem; peripherals are lent to it at boot and handed
/// back by their tasks at power-down
pub struct SleepManager {
    power: Box<dyn PowerControl>,
    config: TimerConfig,
}

impl SleepManager {
    pub fn new(power: Box<dyn PowerControl>, config: TimerConfig) -> Self {
        Self { power, config }
    }

    /// Bring peripherals up and produce the timer state for this power cycle.
    ///
    /// A resume keeps the retained timer state; anything else starts from
    /// defaults. Any peripheral failure here is fatal.
    pub fn boot(
        &mut self,
        display: &mut dyn DisplayDriver,
        audio: &mut dyn AudioDriver,
    ) -> Result<(Arc<PersistentState>, BootKind), BootError> {
        let (state, kind) = match self.retained_for_resume() {
            Some(image) => {
                let asleep = chrono::Utc::now().signed_duration_since(image.written_at);
                info!("Woke up from deep power-down after {}s", asleep.num_seconds());
                display.set_power(true)?;
                let state = PersistentState::from_image(&image);
                // The wake edge is a button press.
                state.reset_idle();
                (state, BootKind::Resume)
            }
            None => {
                info!("Fresh boot");
                display.set_power(true)?;
                display.set_brightness(self.config.display_brightness)?;
                (PersistentState::cold_boot(&self.config), BootKind::ColdStart)
            }
        };

        let shown = render_current(&state, display)?;
        info!("Showing {:?}", shown);

        audio.set_amplifier_enabled(true)?;
        audio.set_volume(self.config.speaker_volume)?;

        Ok((Arc::new(state), kind))
    }

    fn retained_for_resume(&mut self) -> Option<RetainedImage> {
        let resumed = self.power.was_resume_from_low_power();
        let image = self.power.take_retained();
        if !resumed {
            return None;
        }
        match image {
            Some(image) if image.is_consistent_with(&self.config) => Some(image),
            Some(image) => {
                warn!("Discarding inconsistent retained state {:?}", image.timer);
                None
            }
            None => {
                warn!("Resumed without a retained image");
                None
            }
        }
    }

    /// Power down in order: ticks, display task, peripherals, wake source, halt.
    ///
    /// On error the device stays powered with whatever the display last showed.
    pub async fn enter_deep_sleep(
        &mut self,
        reason: PowerDownReason,
        state: &PersistentState,
        ticks: TickSource,
        refresh: DisplayRefresh,
        audio: &mut dyn AudioDriver,
    ) -> Result<(), SleepError> {
        info!("Preparing for deep power-down ({:?})", reason);

        ticks.stop().await;
        if state.is_running() {
            info!("Pausing timer for power-down");
            state.set_running(false);
        }

        let mut display = refresh.shutdown().await?;

        display
            .set_power(false)
            .map_err(SleepError::step("display power-down"))?;
        audio
            .stop()
            .and_then(|()| audio.set_amplifier_enabled(false))
            .map_err(SleepError::step("audio power-down"))?;

        let wake_pin = self.config.wake_pin;
        self.power
            .arm_wake_on_edge(wake_pin)
            .map_err(SleepError::step("arm wake source"))?;

        let image = RetainedImage::capture(state, Some(wake_pin));
        self.power
            .enter_lowest_power_retained_state(&image)
            .map_err(SleepError::step("enter low power"))?;
        Ok(())
    }
}
