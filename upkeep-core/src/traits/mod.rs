//! Port traits
//!
//! These traits define the interface between the timer engine and the
//! board: flash, LED strips, the buzzer and the reporting link. Every
//! method is synchronous; implementations that talk to slow hardware
//! queue the request and return immediately.

pub mod indicator;
pub mod reporter;
pub mod storage;

pub use indicator::{Indicator, ToneOutput};
pub use reporter::{NetworkError, Reporter};
pub use storage::{PersistenceError, TimerStore};
