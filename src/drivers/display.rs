//! Display driver interface

use crate::{error::DriverError, state::Phase};

/// Pixel output for the countdown
pub trait DisplayDriver: Send {
    /// Paint `remaining` as `MM:SS`, styled for `phase`
    fn render(&mut self, remaining: u32, phase: Phase) -> Result<(), DriverError>;
    fn set_power(&mut self, on: bool) -> Result<(), DriverError>;
    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError>;
}

/// Format seconds as `MM:SS`
pub fn format_clock(remaining: u32) -> String {
    format!("{:02}:{:02}", remaining / 60, remaining % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(120), "02:00");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(61), "01:01");
    }
}
