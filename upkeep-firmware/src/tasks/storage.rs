//! Flash write task
//!
//! Flash erases stall the bus for milliseconds, so timer progress is
//! written here rather than in the controller loop.

use defmt::*;

use upkeep_hal_rp2040::flash::FlashStorage;

use crate::channels::SAVE_CHANNEL;
use crate::config::save_state;

#[embassy_executor::task]
pub async fn storage_task(mut storage: FlashStorage<'static>) {
    info!("Storage task started");

    let mut failures: u32 = 0;

    loop {
        let (slot, state) = SAVE_CHANNEL.receive().await;

        match save_state(&mut storage, slot, &state).await {
            Ok(()) => {}
            Err(e) => {
                failures = failures.wrapping_add(1);
                warn!(
                    "Failed to save slot {}: {:?} ({} failures)",
                    slot, e, failures
                );
            }
        }
    }
}
