//! Timer state value and its packed atomic representation

use serde::{Deserialize, Serialize};

use super::Phase;

const PHASE_BIT: u64 = 1 << 32;
const RUNNING_BIT: u64 = 1 << 33;

/// Snapshot of the countdown: remaining seconds, phase and running flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining: u32,
    pub phase: Phase,
    pub running: bool,
}

impl TimerState {
    /// A stopped timer at the start of `phase`
    pub fn stopped(phase: Phase, remaining: u32) -> Self {
        Self { remaining, phase, running: false }
    }

    /// Pack into the single word held by `PersistentState`
    pub fn pack(self) -> u64 {
        let mut word = u64::from(self.remaining);
        if self.phase == Phase::Break {
            word |= PHASE_BIT;
        }
        if self.running {
            word |= RUNNING_BIT;
        }
        word
    }

    pub fn unpack(word: u64) -> Self {
        Self {
            remaining: word as u32,
            phase: if word & PHASE_BIT != 0 { Phase::Break } else { Phase::Work },
            running: word & RUNNING_BIT != 0,
        }
    }

    /// Whether a tick would decrement this state
    pub fn tick_eligible(&self) -> bool {
        self.running && self.remaining > 0
    }

    /// Whether the running countdown has reached zero
    pub fn is_complete(&self) -> bool {
        self.running && self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_keeps_every_field() {
        let state = TimerState { remaining: 1500, phase: Phase::Break, running: true };
        assert_eq!(TimerState::unpack(state.pack()), state);

        let stopped = TimerState::stopped(Phase::Work, 0);
        assert_eq!(TimerState::unpack(stopped.pack()), stopped);
    }

    #[test]
    fn completion_requires_running() {
        assert!(TimerState { remaining: 0, phase: Phase::Work, running: true }.is_complete());
        assert!(!TimerState::stopped(Phase::Work, 0).is_complete());
        assert!(!TimerState::stopped(Phase::Work, 3).tick_eligible());
    }
}
