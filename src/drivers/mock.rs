//! Recording drivers for tests
//!
//! Each double keeps its log behind `Arc<Mutex<..>>` so a clone handed to the
//! timer core can be inspected from the test afterwards.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use super::{AudioDriver, Button, ButtonEvents, DisplayDriver, InputSource, PowerControl};
use crate::{
    error::DriverError,
    state::{Phase, RetainedImage},
};

/// Display that records every frame and power change
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    pub frames: Arc<Mutex<Vec<(u32, Phase)>>>,
    pub power: Arc<Mutex<Vec<bool>>>,
    pub brightness: Arc<Mutex<Option<u8>>>,
    pub fail_power: Arc<Mutex<bool>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<(u32, Phase)> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last_frame(&self) -> Option<(u32, Phase)> {
        self.frames.lock().unwrap().last().copied()
    }

    pub fn power_changes(&self) -> Vec<bool> {
        self.power.lock().unwrap().clone()
    }

    pub fn brightness(&self) -> Option<u8> {
        *self.brightness.lock().unwrap()
    }

    /// Make every following `set_power` fail
    pub fn fail_power(&self) {
        *self.fail_power.lock().unwrap() = true;
    }
}

impl DisplayDriver for RecordingDisplay {
    fn render(&mut self, remaining: u32, phase: Phase) -> Result<(), DriverError> {
        self.frames.lock().unwrap().push((remaining, phase));
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DriverError> {
        if *self.fail_power.lock().unwrap() {
            return Err(DriverError::io("display", "simulated power failure"));
        }
        self.power.lock().unwrap().push(on);
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        *self.brightness.lock().unwrap() = Some(level);
        Ok(())
    }
}

/// Audio calls as recorded by `RecordingAudio`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Tone(u32, Duration),
    Stop,
    Volume(u8),
    Amplifier(bool),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub calls: Arc<Mutex<Vec<AudioCall>>>,
    pub fail_tones: Arc<Mutex<bool>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Frequencies of every tone played, in order
    pub fn tones(&self) -> Vec<u32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                AudioCall::Tone(hz, _) => Some(*hz),
                _ => None,
            })
            .collect()
    }

    /// Make every following `play_tone` fail without recording it
    pub fn fail_tones(&self) {
        *self.fail_tones.lock().unwrap() = true;
    }

    pub fn amplifier_enabled(&self) -> Option<bool> {
        self.calls.lock().unwrap().iter().rev().find_map(|call| match call {
            AudioCall::Amplifier(on) => Some(*on),
            _ => None,
        })
    }

    fn record(&self, call: AudioCall) -> Result<(), DriverError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl AudioDriver for RecordingAudio {
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<(), DriverError> {
        if *self.fail_tones.lock().unwrap() {
            return Err(DriverError::io("audio", "simulated tone failure"));
        }
        self.record(AudioCall::Tone(frequency_hz, duration))
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.record(AudioCall::Stop)
    }

    fn set_volume(&mut self, level: u8) -> Result<(), DriverError> {
        self.record(AudioCall::Volume(level))
    }

    fn set_amplifier_enabled(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.record(AudioCall::Amplifier(enabled))
    }
}

/// Input that replays presses at given poll indices
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pub script: Arc<Mutex<HashMap<u64, ButtonEvents>>>,
    pub polls: Arc<Mutex<u64>>,
}

impl ScriptedInput {
    /// `presses` pairs a zero-based poll index with the button pressed then
    pub fn new(presses: &[(u64, Button)]) -> Self {
        let mut script: HashMap<u64, ButtonEvents> = HashMap::new();
        for (at, button) in presses {
            script.entry(*at).or_default().press(*button);
        }
        Self { script: Arc::new(Mutex::new(script)), polls: Arc::new(Mutex::new(0)) }
    }

    pub fn polls(&self) -> u64 {
        *self.polls.lock().unwrap()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> ButtonEvents {
        let mut polls = self.polls.lock().unwrap();
        let events = self.script.lock().unwrap().remove(&polls).unwrap_or_default();
        *polls += 1;
        events
    }
}

/// In-memory retained region
#[derive(Debug, Clone, Default)]
pub struct MemoryPower {
    pub boot_image: Arc<Mutex<Option<RetainedImage>>>,
    pub resumed: bool,
    pub armed_pin: Arc<Mutex<Option<u8>>>,
    pub slept: Arc<Mutex<VecDeque<RetainedImage>>>,
}

impl MemoryPower {
    /// Power subsystem after a cold start
    pub fn cold() -> Self {
        Self::default()
    }

    /// Power subsystem after the wake edge, holding `image`
    pub fn resumed_with(image: RetainedImage) -> Self {
        Self {
            boot_image: Arc::new(Mutex::new(Some(image))),
            resumed: true,
            ..Self::default()
        }
    }

    pub fn armed_pin(&self) -> Option<u8> {
        *self.armed_pin.lock().unwrap()
    }

    /// Image written by the most recent power-down
    pub fn slept_image(&self) -> Option<RetainedImage> {
        self.slept.lock().unwrap().back().cloned()
    }
}

impl PowerControl for MemoryPower {
    fn was_resume_from_low_power(&self) -> bool {
        self.resumed
    }

    fn take_retained(&mut self) -> Option<RetainedImage> {
        self.boot_image.lock().unwrap().take()
    }

    fn arm_wake_on_edge(&mut self, pin: u8) -> Result<(), DriverError> {
        *self.armed_pin.lock().unwrap() = Some(pin);
        Ok(())
    }

    fn enter_lowest_power_retained_state(
        &mut self,
        image: &RetainedImage,
    ) -> Result<(), DriverError> {
        self.slept.lock().unwrap().push_back(image.clone());
        Ok(())
    }
}
