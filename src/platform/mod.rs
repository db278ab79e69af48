//! Platform abstraction layer
//!
//! Handles the parts of the outside world the simulation reads:
//! - Time/ticks
//! - Input events

pub mod clock;
pub mod input;

pub use clock::{Clock, ManualClock, SystemClock};
pub use input::InputEvent;
