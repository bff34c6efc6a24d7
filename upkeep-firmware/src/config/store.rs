//! Timer progress persistence
//!
//! Loads and saves [`TimerRecord`]s to flash storage, one key per slot.

use defmt::*;

use upkeep_core::config::SystemConfig;
use upkeep_core::{PersistenceError, TimerRecord, TimerState, MAX_RECORD_SIZE, MAX_TIMERS};
use upkeep_hal_rp2040::flash::{FlashError, FlashStorage, StorageKey};
use upkeep_hal_rp2040::FlashStorageTrait;

/// Load result per timer slot, handed to the controller for boot
pub type SavedStates = [Result<Option<TimerState>, PersistenceError>; MAX_TIMERS];

fn flash_error(e: FlashError) -> PersistenceError {
    match e {
        FlashError::Corrupted => PersistenceError::Corrupted,
        _ => PersistenceError::Storage,
    }
}

/// Load the saved progress of every configured timer
///
/// A slot with nothing stored yields `Ok(None)`.
pub async fn load_states(storage: &mut FlashStorage<'_>, config: &SystemConfig) -> SavedStates {
    let mut states: SavedStates = [Ok(None); MAX_TIMERS];

    for timer in config.timers.iter() {
        let slot = timer.slot;
        let result = load_state(storage, slot).await;

        match &result {
            Ok(Some(state)) => {
                debug!(
                    "Slot {}: {} units, overdue={}",
                    slot, state.current, state.overdue
                );
            }
            Ok(None) => debug!("Slot {}: nothing saved", slot),
            Err(e) => warn!("Slot {}: failed to load progress: {:?}", slot, e),
        }

        if let Some(entry) = states.get_mut(slot as usize) {
            *entry = result;
        }
    }

    states
}

/// Inner function that returns errors
async fn load_state(
    storage: &mut FlashStorage<'_>,
    slot: u8,
) -> Result<Option<TimerState>, PersistenceError> {
    let key = StorageKey::timer(slot).ok_or(PersistenceError::Storage)?;

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let len = match storage.read(key, &mut buffer).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => return Ok(None),
        Err(e) => return Err(flash_error(e)),
    };

    trace!("Read {} bytes for slot {}", len, slot);

    let state = TimerRecord::decode(&buffer[..len]).map_err(|e| {
        warn!("Slot {} record rejected: {:?}", slot, e);
        PersistenceError::from(e)
    })?;

    Ok(Some(state))
}

/// Save one timer's progress
pub async fn save_state(
    storage: &mut FlashStorage<'_>,
    slot: u8,
    state: &TimerState,
) -> Result<(), PersistenceError> {
    let key = StorageKey::timer(slot).ok_or(PersistenceError::Storage)?;

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let bytes = TimerRecord::new(state).encode(&mut buffer)?;

    storage.write(key, bytes).await.map_err(flash_error)?;

    trace!("Saved slot {}: {} units", slot, state.current);
    Ok(())
}
