//! Deep power-down lifecycle

pub mod sleep_manager;

pub use sleep_manager::{BootKind, SleepManager};
