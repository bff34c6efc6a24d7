//! Controller to network-bridge protocol
//!
//! The maintenance controller has no network stack of its own. Timer reports
//! leave the board over a UART to a small bridge (any WiFi-capable module)
//! which forwards them to the remote listener.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The controller pings the bridge once per second. A bridge that stops
//! answering is treated as a lost link.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod report;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{BridgeMessage, ControllerMessage, RemoteAddress};
pub use report::{TimerReport, MAX_NAME_LEN, MAX_REPORT_SIZE};
