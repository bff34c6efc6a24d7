//! Persisted timer record
//!
//! Each timer slot stores one [`TimerRecord`] in flash. The record wraps
//! the `{current, overdue}` progress with a magic number, a format
//! version and a CRC32 so torn or stale writes are detected on load.

use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Magic number to identify a timer record
pub const RECORD_MAGIC: u32 = 0x55504B54; // "UPKT"

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Upper bound of a serialized record
pub const MAX_RECORD_SIZE: usize = 32;

/// Record decode and encode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Serialization failed
    Encode,
    /// Deserialization failed
    Decode,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Flash representation of a timer's progress
///
/// This struct is serialized to flash using postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerRecord {
    pub magic: u32,
    pub version: u8,
    pub current: u32,
    pub overdue: bool,
    /// CRC32 over magic..overdue
    pub crc: u32,
}

impl TimerRecord {
    /// Wrap a state with a valid header and CRC
    pub fn new(state: &TimerState) -> Self {
        let mut record = Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            current: state.current,
            overdue: state.overdue,
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// Check magic and version
    pub fn is_valid(&self) -> bool {
        self.magic == RECORD_MAGIC && self.version == RECORD_VERSION
    }

    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.current.to_le_bytes());
        crc = crc32_update(crc, &[self.overdue as u8]);
        !crc
    }

    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// The wrapped progress
    pub fn state(&self) -> TimerState {
        TimerState {
            current: self.current,
            overdue: self.overdue,
        }
    }

    /// Serialize into `buf`, returning the used bytes
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], RecordError> {
        postcard::to_slice(self, buf).map_err(|_| RecordError::Encode)
    }

    /// Deserialize and validate a stored record
    pub fn decode(bytes: &[u8]) -> Result<TimerState, RecordError> {
        let record: TimerRecord = postcard::from_bytes(bytes).map_err(|_| RecordError::Decode)?;

        if !record.is_valid() {
            return Err(RecordError::InvalidFormat);
        }
        if !record.verify_crc() {
            return Err(RecordError::CrcMismatch);
        }

        Ok(record.state())
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc_consistency() {
        let mut record = TimerRecord::new(&TimerState {
            current: 13,
            overdue: true,
        });
        assert!(record.verify_crc());

        record.current = 14;
        assert!(!record.verify_crc());
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(!crc32_update(0xFFFFFFFF, b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let state = TimerState {
            current: 7,
            overdue: false,
        };
        let mut record = TimerRecord::new(&state);
        record.overdue = true;

        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();
        assert_eq!(TimerRecord::decode(bytes), Err(RecordError::CrcMismatch));
    }

    #[test]
    fn test_decode_rejects_wrong_magic() {
        let mut record = TimerRecord::new(&TimerState::default());
        record.magic = 0x50494443;
        record.update_crc();

        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();
        assert_eq!(
            TimerRecord::decode(bytes),
            Err(RecordError::InvalidFormat)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(TimerRecord::decode(&[]), Err(RecordError::Decode));
        assert!(TimerRecord::decode(&[0xFF; 3]).is_err());
    }

    proptest! {
        #[test]
        fn prop_record_round_trip(current in any::<u32>(), overdue in any::<bool>()) {
            let state = TimerState { current, overdue };
            let mut buf = [0u8; MAX_RECORD_SIZE];
            let bytes = TimerRecord::new(&state).encode(&mut buf).unwrap();
            prop_assert!(bytes.len() <= MAX_RECORD_SIZE);
            prop_assert_eq!(TimerRecord::decode(bytes), Ok(state));
        }
    }
}
