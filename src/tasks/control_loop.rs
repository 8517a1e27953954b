//! Control loop: polls buttons and drives the timer state machine

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::DisplayNotifier;
use crate::{
    config::TimerConfig,
    drivers::{AudioDriver, ButtonEvents, InputSource},
    error::DriverError,
    state::{Phase, PersistentState},
};

/// Alarm tones, each played for `ALARM_TONE_LENGTH`
pub const ALARM_TONES_HZ: [u32; 2] = [1000, 1500];
pub const ALARM_TONE_LENGTH: Duration = Duration::from_millis(500);

/// Why the control loop handed over to the sleep manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDownReason {
    /// The grace period after pausing ran out
    Paused,
    /// No input for longer than the idle timeout
    Idle,
    /// Requested from outside the timer (signal, supervisor)
    Requested,
}

pub struct ControlLoop {
    state: Arc<PersistentState>,
    notifier: Arc<DisplayNotifier>,
    input: Box<dyn InputSource>,
    audio: Box<dyn AudioDriver>,
    config: TimerConfig,
    power_down_at: Option<Instant>,
}

impl ControlLoop {
    pub fn new(
        state: Arc<PersistentState>,
        notifier: Arc<DisplayNotifier>,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioDriver>,
        config: TimerConfig,
    ) -> Self {
        Self { state, notifier, input, audio, config, power_down_at: None }
    }

    /// Poll until a transition calls for deep power-down
    pub async fn run(&mut self) -> PowerDownReason {
        info!("Starting control loop every {:?}", self.config.poll_period);
        let mut poll = interval(self.config.poll_period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            poll.tick().await;
            if let Some(reason) = self.step().await {
                info!("Control loop requesting power-down: {:?}", reason);
                return reason;
            }
        }
    }

    /// One iteration: toggle, reset, phase completion, then the idle checks
    #[instrument(level = "trace", name = "control", skip_all)]
    pub async fn step(&mut self) -> Option<PowerDownReason> {
        let events = self.input.poll();
        if events.toggle {
            self.toggle();
        }
        if events.reset {
            self.reset();
        }
        self.complete_phase().await;
        self.check_power_down(events)
    }

    /// When a paused timer will power down, if scheduled
    pub fn power_down_at(&self) -> Option<Instant> {
        self.power_down_at
    }

    /// Hand the speaker back once the loop is done with it
    pub fn into_audio(self) -> Box<dyn AudioDriver> {
        self.audio
    }

    fn toggle(&mut self) {
        let now = self.state.toggle_running();
        self.state.reset_idle();

        if now.running {
            if self.power_down_at.take().is_some() {
                debug!("Pending power-down cancelled");
            }
            info!("Timer started at {} remaining", now.remaining);
        } else {
            let grace = self.config.idle_timeout_when_stopped;
            self.power_down_at = Some(Instant::now() + grace);
            info!("Timer paused, powering down in {:?} unless resumed", grace);
        }
    }

    fn reset(&mut self) {
        let config = &self.config;
        let now = self.state.restart_phase(|phase| config.phase_duration(phase));
        self.state.reset_idle();
        self.notifier.trigger();
        if self.power_down_at.take().is_some() {
            debug!("Pending power-down cancelled");
        }
        info!("{} phase restarted at {}s", now.phase, now.remaining);
    }

    async fn complete_phase(&mut self) {
        let observed = self.state.snapshot();
        if !observed.is_complete() {
            return;
        }

        if observed.phase == Phase::Work || !self.config.disable_alarm_after_break {
            if let Err(e) = self.sound_alarm().await {
                warn!("Alarm playback failed: {}", e);
            }
        } else {
            debug!("Alarm suppressed after break");
        }

        let next_duration = self.config.phase_duration(observed.phase.next());
        match self.state.complete_phase(observed, next_duration) {
            Ok(next) => {
                info!(
                    "{} phase complete, starting {} ({}s)",
                    observed.phase, next.phase, next.remaining
                );
                self.notifier.trigger();
            }
            Err(current) => debug!("Phase completion superseded, state is {:?}", current),
        }
    }

    /// Play the alarm tones. The speaker is stopped even when a tone fails.
    async fn sound_alarm(&mut self) -> Result<(), DriverError> {
        let played = self.play_tones().await;
        let stopped = self.audio.stop();
        played.and(stopped)
    }

    async fn play_tones(&mut self) -> Result<(), DriverError> {
        for hz in ALARM_TONES_HZ {
            self.audio.play_tone(hz, ALARM_TONE_LENGTH)?;
            sleep(ALARM_TONE_LENGTH).await;
        }
        Ok(())
    }

    fn check_power_down(&mut self, events: ButtonEvents) -> Option<PowerDownReason> {
        if !events.any() && !self.state.is_running() {
            self.state.increment_idle();
        }
        if self.state.idle_count() > self.config.idle_limit() {
            return Some(PowerDownReason::Idle);
        }

        match self.power_down_at {
            Some(deadline) if Instant::now() >= deadline => Some(PowerDownReason::Paused),
            _ => None,
        }
    }
}
