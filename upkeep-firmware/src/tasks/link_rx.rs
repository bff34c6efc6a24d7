//! Bridge UART receive task
//!
//! Receives frames from the network bridge and signals the controller.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use upkeep_protocol::{BridgeMessage, FrameParser};

use crate::channels::{HEARTBEAT_RECEIVED, NETWORK_STATE};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives and parses frames from the bridge
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match BridgeMessage::from_frame(&frame) {
                            Ok(message) => handle_bridge_message(message),
                            Err(e) => warn!("Failed to parse bridge message: {:?}", e),
                        },
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn handle_bridge_message(message: BridgeMessage) {
    match message {
        BridgeMessage::Pong => {
            trace!("PONG received");
            HEARTBEAT_RECEIVED.signal(());
        }
        BridgeMessage::Link { up } => {
            debug!("Bridge link state: {}", up);
            NETWORK_STATE.signal(up);
        }
    }
}
