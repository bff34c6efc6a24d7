//! RP2040-specific HAL for the maintenance timer firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `upkeep-hal` traits and the `upkeep-core` output ports:
//!
//! - Flash storage driver (implements `upkeep_hal::FlashStorage`)
//! - PIO-based WS2812 LED strip driver
//! - PWM buzzer (implements `upkeep_core::ToneOutput`)

#![no_std]

pub mod flash;
pub mod pio;
pub mod tone;
pub mod ws2812;

// Re-export shared traits from upkeep-hal for convenience
pub use upkeep_hal::{FlashStorage as FlashStorageTrait, StorageKey};
