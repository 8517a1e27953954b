//! Peripheral interfaces
//!
//! The timer core only talks to hardware through these traits. `terminal`
//! and `power` hold the host implementations used by the binary; `mock`
//! holds recording doubles for tests.

pub mod audio;
pub mod display;
pub mod input;
pub mod mock;
pub mod power;
pub mod terminal;

// Re-export main types
pub use audio::AudioDriver;
pub use display::{format_clock, DisplayDriver};
pub use input::{Button, ButtonEvents, InputSource};
pub use power::{FilePower, PowerControl};

