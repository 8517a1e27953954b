//! Error types
//!
//! Everything here is fatal to the current power cycle. Timer transitions
//! themselves never fail.

use thiserror::Error;

/// A peripheral call failed
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{device} failure: {reason}")]
    Io { device: &'static str, reason: String },
}

impl DriverError {
    pub fn io(device: &'static str, reason: impl Into<String>) -> Self {
        Self::Io { device, reason: reason.into() }
    }
}

/// The retained region could not be read or written
#[derive(Debug, Error)]
pub enum RetainedError {
    #[error("retained region I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("retained region format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Startup could not complete; the device must not enter its loops
#[derive(Debug, Error)]
pub enum BootError {
    #[error("peripheral setup failed: {0}")]
    Driver(#[from] DriverError),
    #[error("retained region unavailable: {0}")]
    Retained(#[from] RetainedError),
}

/// A power-down step failed; the device stays powered
#[derive(Debug, Error)]
pub enum SleepError {
    #[error("power-down step `{step}` failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: DriverError,
    },
    #[error("display task did not exit cleanly: {0}")]
    DisplayTask(#[from] tokio::task::JoinError),
}

impl SleepError {
    pub(crate) fn step(step: &'static str) -> impl FnOnce(DriverError) -> Self {
        move |source| Self::Step { step, source }
    }
}
