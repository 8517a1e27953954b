//! Tyzr - work/break interval timer core
//!
//! A countdown that alternates between work and break phases, drives a
//! display and an alarm, and powers down between interactions while keeping
//! its state in a retained region.

pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod power;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use app::{run_power_cycle, CycleOutcome, Drivers};
pub use config::{Config, TimerConfig};
pub use state::{Phase, PersistentState};
pub use utils::signals::power_down_signal;
