//! Timer state shared across execution contexts
//!
//! Remaining time, phase and the running flag live together in one atomic
//! word so that every transition is a single atomic operation. The tick
//! source and the control loop both write `remaining`; the phase flip only
//! lands if the word still holds the completed state the control loop saw.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tracing::debug;

use super::{Phase, RetainedImage, TimerState};
use crate::config::TimerConfig;

/// State that must survive deep power-down
#[derive(Debug)]
pub struct PersistentState {
    word: AtomicU64,
    idle_counter: AtomicU32,
}

impl PersistentState {
    pub fn new(timer: TimerState, idle_counter: u32) -> Self {
        Self {
            word: AtomicU64::new(timer.pack()),
            idle_counter: AtomicU32::new(idle_counter),
        }
    }

    /// Defaults for a fresh boot: stopped at the start of a work phase
    pub fn cold_boot(config: &TimerConfig) -> Self {
        Self::new(TimerState::stopped(Phase::Work, config.work_duration), 0)
    }

    /// Rebuild from the record written before the last power-down
    pub fn from_image(image: &RetainedImage) -> Self {
        Self::new(image.timer, image.idle_counter)
    }

    /// Consistent view of remaining time, phase and running flag
    pub fn snapshot(&self) -> TimerState {
        TimerState::unpack(self.word.load(Ordering::Acquire))
    }

    pub fn remaining(&self) -> u32 {
        self.snapshot().remaining
    }

    pub fn phase(&self) -> Phase {
        self.snapshot().phase
    }

    pub fn is_running(&self) -> bool {
        self.snapshot().running
    }

    /// Decrement `remaining` by one if the timer is running and not at zero.
    ///
    /// Returns the new state, or `None` when the tick was not eligible.
    pub fn tick(&self) -> Option<TimerState> {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let state = TimerState::unpack(word);
                state.tick_eligible().then(|| {
                    TimerState { remaining: state.remaining - 1, ..state }.pack()
                })
            })
            .ok()
            .map(|previous| {
                let previous = TimerState::unpack(previous);
                TimerState { remaining: previous.remaining - 1, ..previous }
            })
    }

    /// Flip the running flag, returning the new state
    pub fn toggle_running(&self) -> TimerState {
        self.update(|state| TimerState { running: !state.running, ..state })
    }

    pub fn set_running(&self, running: bool) -> TimerState {
        self.update(|state| TimerState { running, ..state })
    }

    /// Re-seed `remaining` for the current phase and start running.
    ///
    /// The stop, re-seed and restart happen as one store, so no tick can
    /// land between them.
    pub fn restart_phase(&self, duration_of: impl Fn(Phase) -> u32) -> TimerState {
        self.update(|state| TimerState {
            remaining: duration_of(state.phase),
            phase: state.phase,
            running: true,
        })
    }

    /// Switch to the next phase if the word still holds `observed`.
    ///
    /// `observed` must be a completed state (running, zero remaining). On
    /// failure the current state is returned and nothing is written.
    pub fn complete_phase(
        &self,
        observed: TimerState,
        next_duration: u32,
    ) -> Result<TimerState, TimerState> {
        if !observed.is_complete() {
            return Err(self.snapshot());
        }
        let next = TimerState {
            remaining: next_duration,
            phase: observed.phase.next(),
            running: true,
        };
        self.word
            .compare_exchange(observed.pack(), next.pack(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| next)
            .map_err(TimerState::unpack)
    }

    pub fn idle_count(&self) -> u32 {
        self.idle_counter.load(Ordering::Acquire)
    }

    pub fn reset_idle(&self) {
        self.idle_counter.store(0, Ordering::Release);
    }

    /// Count one more idle control-loop iteration
    pub fn increment_idle(&self) -> u32 {
        let count = self.idle_count().saturating_add(1);
        self.idle_counter.store(count, Ordering::Release);
        count
    }

    fn update(&self, f: impl Fn(TimerState) -> TimerState) -> TimerState {
        let mut current = self.word.load(Ordering::Acquire);
        loop {
            let next = f(TimerState::unpack(current));
            match self.word.compare_exchange_weak(
                current,
                next.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!("Timer state now {:?}", next);
                    return next;
                }
                Err(actual) => current = actual,
            }
        }
    }
}
