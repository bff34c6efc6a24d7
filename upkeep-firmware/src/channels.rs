//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The controller never blocks on them: ports use `try_send` and report a
//! full queue as a failure.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU32;

use upkeep_core::{IndicatorFrame, TimerState};
use upkeep_protocol::Frame;

/// Pending flash writes (one per timer is the steady state)
const SAVE_CHANNEL_SIZE: usize = 8;

/// Pending strip refreshes (a boot renders every timer at once)
const RENDER_CHANNEL_SIZE: usize = 16;

/// Pending bridge frames
const LINK_TX_SIZE: usize = 8;

/// Timer progress to write to flash, keyed by slot
pub static SAVE_CHANNEL: Channel<CriticalSectionRawMutex, (u8, TimerState), SAVE_CHANNEL_SIZE> =
    Channel::new();

/// Strip frames for the indicator task
pub static RENDER_CHANNEL: Channel<CriticalSectionRawMutex, IndicatorFrame, RENDER_CHANNEL_SIZE> =
    Channel::new();

/// Frames for the bridge UART
pub static LINK_TX: Channel<CriticalSectionRawMutex, Frame, LINK_TX_SIZE> = Channel::new();

/// Signal that a PONG was received from the bridge
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Latest network state announced by the bridge
pub static NETWORK_STATE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Strip frames dropped because the render queue was full
pub static RENDER_DROPS: AtomicU32 = AtomicU32::new(0);
