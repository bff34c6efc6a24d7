//! Timer progress storage

use crate::record::RecordError;
use crate::timer::TimerState;

/// Errors from timer storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// Storage medium failed
    Storage,
    /// Stored bytes are not a valid record
    Corrupted,
    /// Write queue is full, the request was dropped
    Busy,
}

impl From<RecordError> for PersistenceError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Encode => PersistenceError::Storage,
            RecordError::Decode | RecordError::InvalidFormat | RecordError::CrcMismatch => {
                PersistenceError::Corrupted
            }
        }
    }
}

/// Keyed store for `{current, overdue}` per timer slot
///
/// Best effort: a failed save leaves the in-memory timer untouched.
pub trait TimerStore {
    /// Load the state saved for `slot`
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&mut self, slot: u8) -> Result<Option<TimerState>, PersistenceError>;

    /// Save the state for `slot`
    fn save(&mut self, slot: u8, state: &TimerState) -> Result<(), PersistenceError>;
}
