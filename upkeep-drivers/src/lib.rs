//! Hardware driver implementations
//!
//! This crate provides board-agnostic drivers built on `embedded-hal`
//! for the maintenance timer peripherals:
//!
//! - Reset/mute buttons sampled into raw levels
//! - LED strip frames (progress fill with global brightness)

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod strip;

pub use button::ButtonBank;
pub use strip::PixelFrame;
