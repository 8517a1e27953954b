//! Utility functions module

pub mod signals;

// Re-export main functions
pub use signals::power_down_signal;
