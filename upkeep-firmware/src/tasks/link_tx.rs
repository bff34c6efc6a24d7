//! Bridge UART transmit task
//!
//! Sends queued frames to the network bridge and pings it once per second.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Ticker};
use embedded_io_async::Write;

use upkeep_protocol::{ControllerMessage, Frame, MAX_FRAME_SIZE};

use crate::channels::LINK_TX;

/// Heartbeat interval
const PING_INTERVAL_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    let mut ticker = Ticker::every(Duration::from_millis(PING_INTERVAL_MS));

    loop {
        match select(LINK_TX.receive(), ticker.next()).await {
            Either::First(frame) => send_frame(&mut tx, &frame).await,
            Either::Second(()) => match ControllerMessage::Ping.to_frame() {
                Ok(ping) => {
                    trace!("PING");
                    send_frame(&mut tx, &ping).await;
                }
                Err(e) => warn!("Failed to build PING: {:?}", e),
            },
        }
    }
}

async fn send_frame(tx: &mut BufferedUartTx, frame: &Frame) {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = tx.write_all(&buf[..len]).await {
                warn!("Failed to send frame 0x{:02x}: {:?}", frame.msg_type, e);
            }
        }
        Err(e) => warn!("Failed to encode frame: {:?}", e),
    }
}
