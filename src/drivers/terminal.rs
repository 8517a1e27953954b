//! Host drivers for running the timer in a terminal

use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use super::{format_clock, AudioDriver, Button, ButtonEvents, DisplayDriver, InputSource};
use crate::{error::DriverError, state::Phase};

/// Prints the clock to stdout
#[derive(Debug)]
pub struct TerminalDisplay {
    powered: bool,
    brightness: u8,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self { powered: true, brightness: 0 }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDriver for TerminalDisplay {
    fn render(&mut self, remaining: u32, phase: Phase) -> Result<(), DriverError> {
        if !self.powered {
            return Err(DriverError::io("display", "render while powered off"));
        }
        println!("[{:>5}] {}", phase.as_str(), format_clock(remaining));
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DriverError> {
        info!("Display power {}", if on { "on" } else { "off" });
        self.powered = on;
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        debug!("Display brightness {} -> {}", self.brightness, level);
        self.brightness = level;
        Ok(())
    }
}

/// Logs tones instead of playing them
#[derive(Debug, Default)]
pub struct LogAudio {
    amplifier: bool,
}

impl AudioDriver for LogAudio {
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<(), DriverError> {
        if !self.amplifier {
            warn!("Tone requested with amplifier disabled");
        }
        info!("Tone {} Hz for {:?}", frequency_hz, duration);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        debug!("Tone stopped");
        Ok(())
    }

    fn set_volume(&mut self, level: u8) -> Result<(), DriverError> {
        debug!("Speaker volume {}", level);
        Ok(())
    }

    fn set_amplifier_enabled(&mut self, enabled: bool) -> Result<(), DriverError> {
        info!("Amplifier {}", if enabled { "enabled" } else { "disabled" });
        self.amplifier = enabled;
        Ok(())
    }
}

/// Buttons fed from a channel; presses queue up until the next poll
#[derive(Debug)]
pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<Button>,
}

impl ChannelInput {
    pub fn new(rx: mpsc::UnboundedReceiver<Button>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self) -> ButtonEvents {
        let mut events = ButtonEvents::default();
        while let Ok(button) = self.rx.try_recv() {
            events.press(button);
        }
        events
    }
}

/// Map a line typed on stdin to a button
pub fn parse_button(line: &str) -> Option<Button> {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" => Some(Button::Toggle),
        "b" => Some(Button::Reset),
        _ => None,
    }
}

/// Read `a`/`b` lines from stdin as button presses
pub fn stdin_buttons() -> ChannelInput {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_button(&line) {
                    Some(button) => {
                        if tx.send(button).is_err() {
                            break;
                        }
                    }
                    None => warn!("Unknown input {:?}; use `a` (start/stop) or `b` (reset)", line),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    ChannelInput::new(rx)
}
