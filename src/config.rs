//! Configuration: build-time timer constants and host CLI arguments

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::state::Phase;

/// Work phase length in minutes
pub const WORK_PHASE_MINUTES: u32 = 25;
/// Break phase length in minutes
pub const BREAK_PHASE_MINUTES: u32 = 5;
/// Minutes without input (timer stopped) before powering down
pub const IDLE_TIMEOUT_MINUTES: u64 = 2;
/// Seconds to wait after the timer is paused before powering down
pub const IDLE_TIMEOUT_WHEN_STOPPED_SECS: u64 = 10;
/// Skip the alarm when a break ends
pub const DISABLE_ALARM_AFTER_BREAK: bool = false;
pub const DISPLAY_BRIGHTNESS: u8 = 64;
pub const SPEAKER_VOLUME: u8 = 128;
/// Input line that wakes the device from deep power-down
pub const WAKEUP_PIN: u8 = 39;

/// Read-only timer configuration, fixed at build time on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub work_duration: u32,
    pub break_duration: u32,
    pub idle_timeout: Duration,
    pub idle_timeout_when_stopped: Duration,
    pub disable_alarm_after_break: bool,
    pub display_brightness: u8,
    pub speaker_volume: u8,
    pub wake_pin: u8,
    pub tick_period: Duration,
    pub poll_period: Duration,
}

impl TimerConfig {
    pub const BUILT_IN: TimerConfig = TimerConfig {
        work_duration: WORK_PHASE_MINUTES * 60,
        break_duration: BREAK_PHASE_MINUTES * 60,
        idle_timeout: Duration::from_secs(IDLE_TIMEOUT_MINUTES * 60),
        idle_timeout_when_stopped: Duration::from_secs(IDLE_TIMEOUT_WHEN_STOPPED_SECS),
        disable_alarm_after_break: DISABLE_ALARM_AFTER_BREAK,
        display_brightness: DISPLAY_BRIGHTNESS,
        speaker_volume: SPEAKER_VOLUME,
        wake_pin: WAKEUP_PIN,
        tick_period: Duration::from_secs(1),
        poll_period: Duration::from_millis(100),
    };

    /// Seconds a phase lasts
    pub fn phase_duration(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_duration,
            Phase::Break => self.break_duration,
        }
    }

    /// Number of idle control-loop iterations tolerated before powering down
    pub fn idle_limit(&self) -> u32 {
        let poll = self.poll_period.as_millis().max(1);
        (self.idle_timeout.as_millis() / poll).min(u32::MAX as u128) as u32
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::BUILT_IN
    }
}

/// CLI arguments for the host build
#[derive(Parser)]
#[command(name = "tyzr")]
#[command(about = "Work/break interval timer with deep power-down")]
#[command(version)]
pub struct Config {
    /// File standing in for the retained memory region
    #[arg(short, long, default_value = "tyzr-retained.json")]
    pub retained: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_durations_follow_constants() {
        let config = TimerConfig::BUILT_IN;
        assert_eq!(config.phase_duration(Phase::Work), 25 * 60);
        assert_eq!(config.phase_duration(Phase::Break), 5 * 60);
    }

    #[test]
    fn idle_limit_counts_poll_iterations() {
        let config = TimerConfig {
            idle_timeout: Duration::from_secs(3),
            poll_period: Duration::from_millis(100),
            ..TimerConfig::BUILT_IN
        };
        assert_eq!(config.idle_limit(), 30);
    }
}
