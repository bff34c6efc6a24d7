//! Board-agnostic maintenance timer engine
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Software clock deriving second/minute/hour/day ticks from a millisecond counter
//! - Debounced button classification (short press mutes, long press resets)
//! - Alert buzzer scheduling
//! - Maintenance timers and the engine that routes ticks to them
//! - Flash record format for timer progress
//! - Bridge link health monitoring
//! - Configuration types and the configuration file parser
//! - Port traits for storage, indicators, reporting and the buzzer

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alert;
pub mod clock;
pub mod config;
pub mod engine;
pub mod input;
pub mod link;
pub mod record;
pub mod timer;
pub mod traits;

pub use alert::{AlertPhase, AlertScheduler};
pub use clock::{ClockMultiplexer, ClockTicks};
pub use engine::{BootOutcome, Ports, StepOutcome, TimerEngine, MAX_TIMERS};
pub use input::{DebouncedInput, PressEvent};
pub use link::LinkMonitor;
pub use record::{RecordError, TimerRecord, MAX_RECORD_SIZE};
pub use timer::{Effect, Effects, IndicatorFrame, MaintenanceTimer, TimerState};
pub use traits::{
    Indicator, NetworkError, PersistenceError, Reporter, TimerStore, ToneOutput,
};
