//! State management module
//!
//! Timer state shared between the tick source, the control loop and the
//! display task, plus the record that survives deep power-down.

pub mod persistent_state;
pub mod phase;
pub mod retained;
pub mod timer_state;

// Re-export main types
pub use persistent_state::PersistentState;
pub use phase::Phase;
pub use retained::{RetainedImage, RetainedStore};
pub use timer_state::TimerState;
