//! Timer report record
//!
//! One report is sent per timer tick or reset. The bridge forwards the
//! postcard bytes unchanged; the listener prints one summary line per report.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::frame::{FrameError, MAX_PAYLOAD_SIZE};

/// Maximum timer name length in bytes
pub const MAX_NAME_LEN: usize = 24;

/// Upper bound of an encoded report
///
/// Name (length prefix + bytes), bool, two varint u32s.
pub const MAX_REPORT_SIZE: usize = 1 + MAX_NAME_LEN + 1 + 5 + 5;

const _: () = assert!(MAX_REPORT_SIZE <= MAX_PAYLOAD_SIZE);

/// Snapshot of a single maintenance timer as seen by the remote listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerReport {
    /// Display name of the timer
    pub name: String<MAX_NAME_LEN>,
    /// Whether the timer has passed its period
    pub overdue: bool,
    /// Units counted since the last reset
    pub current: u32,
    /// Units allowed before the timer is overdue
    pub period: u32,
}

impl TimerReport {
    /// Serialize into `buffer`, returning the used prefix
    pub fn encode<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], FrameError> {
        postcard::to_slice(self, buffer).map_err(|_| FrameError::Payload)
    }

    /// Deserialize a report payload
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        postcard::from_bytes(bytes).map_err(|_| FrameError::Payload)
    }
}

impl fmt::Display for TimerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Overdue: {} Count: {} Interval: {}",
            self.name, self.overdue, self.current, self.period
        )
    }
}
