//! Background tasks module
//!
//! The three execution contexts of a power cycle: the 1 Hz tick source, the
//! control loop and the display refresh task.

pub mod control_loop;
pub mod display_refresh;
pub mod tick_source;

// Re-export main types
pub use control_loop::{ControlLoop, PowerDownReason};
pub use display_refresh::{render_current, DisplayNotifier, DisplayRefresh};
pub use tick_source::TickSource;
