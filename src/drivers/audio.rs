//! Audio driver interface

use std::time::Duration;

use crate::error::DriverError;

pub trait AudioDriver: Send {
    /// Start a tone; returns without waiting for it to finish
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<(), DriverError>;
    fn stop(&mut self) -> Result<(), DriverError>;
    fn set_volume(&mut self, level: u8) -> Result<(), DriverError>;
    /// Drive the external amplifier's enable line
    fn set_amplifier_enabled(&mut self, enabled: bool) -> Result<(), DriverError>;
}
