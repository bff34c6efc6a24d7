//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Number of timer slots addressable by [`StorageKey::Timer`]
pub const MAX_TIMER_SLOTS: u8 = 16;

/// First key byte used for timer slots
const TIMER_KEY_BASE: u8 = 0x10;

/// Storage keys for persisted data
///
/// Every maintenance timer owns one slot. The actual storage
/// implementation handles wear leveling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageKey {
    /// Progress record of one timer
    Timer(u8),
}

impl StorageKey {
    /// Key for a timer slot, if the slot is addressable
    pub fn timer(slot: u8) -> Option<Self> {
        (slot < MAX_TIMER_SLOTS).then_some(StorageKey::Timer(slot))
    }

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        match self {
            StorageKey::Timer(slot) => TIMER_KEY_BASE + (slot % MAX_TIMER_SLOTS),
        }
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            v if (TIMER_KEY_BASE..TIMER_KEY_BASE + MAX_TIMER_SLOTS).contains(&v) => {
                Some(StorageKey::Timer(v - TIMER_KEY_BASE))
            }
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Flash storage trait
///
/// Provides wear-leveled key-value storage for timer records.
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Atomic writes where possible
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Arguments
    /// * `key` - The storage key to read
    /// * `buffer` - Buffer to read data into
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    ///
    /// # Arguments
    /// * `key` - The storage key to write
    /// * `data` - Data to write
    fn write(&mut self, key: StorageKey, data: &[u8]) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Erase all stored data
    ///
    /// This erases the entire storage partition, including every timer.
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_keys_are_distinct_bytes() {
        for slot in 0..MAX_TIMER_SLOTS {
            let key = StorageKey::timer(slot).unwrap();
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_ne!(
            StorageKey::Timer(0).as_u8(),
            StorageKey::Timer(1).as_u8()
        );
    }

    #[test]
    fn test_out_of_range_slots_rejected() {
        assert_eq!(StorageKey::timer(MAX_TIMER_SLOTS), None);
        assert_eq!(StorageKey::from_u8(0x00), None);
        assert_eq!(StorageKey::from_u8(TIMER_KEY_BASE + MAX_TIMER_SLOTS), None);
    }
}
