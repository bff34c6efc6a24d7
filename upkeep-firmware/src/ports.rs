//! Engine port implementations
//!
//! The timer engine runs synchronously inside the controller task. Its
//! ports hand work to the storage, indicator and link tasks through the
//! static channels and never wait.

use defmt::*;
use portable_atomic::Ordering;

use upkeep_core::config::Color;
use upkeep_core::{
    Indicator, IndicatorFrame, LinkMonitor, NetworkError, PersistenceError, Reporter,
    TimerState, TimerStore,
};
use upkeep_protocol::{ControllerMessage, RemoteAddress};

use crate::channels::{LINK_TX, RENDER_CHANNEL, RENDER_DROPS, SAVE_CHANNEL};
use crate::config::SavedStates;

/// Saves go to the storage task; loads come from the boot-time read
pub struct QueuedStore {
    saved: SavedStates,
}

impl QueuedStore {
    pub fn new(saved: SavedStates) -> Self {
        Self { saved }
    }
}

impl TimerStore for QueuedStore {
    fn load(&mut self, slot: u8) -> Result<Option<TimerState>, PersistenceError> {
        self.saved
            .get(slot as usize)
            .copied()
            .unwrap_or(Ok(None))
    }

    fn save(&mut self, slot: u8, state: &TimerState) -> Result<(), PersistenceError> {
        SAVE_CHANNEL
            .try_send((slot, *state))
            .map_err(|_| PersistenceError::Busy)
    }
}

/// Strip frames go to the indicator task
pub struct QueuedIndicator;

impl Indicator for QueuedIndicator {
    fn render(&mut self, channel: u8, color: Color, total: u16, lit: u16) {
        let frame = IndicatorFrame {
            channel,
            color,
            total,
            lit,
        };
        if RENDER_CHANNEL.try_send(frame).is_err() {
            RENDER_DROPS.fetch_add(1, Ordering::Relaxed);
            warn!("Render channel full, dropping frame for strip {}", channel);
        }
    }
}

/// Reports go to the bridge through the link TX task
pub struct BridgeReporter {
    monitor: LinkMonitor,
    remote: RemoteAddress,
}

impl BridgeReporter {
    pub fn new(remote: RemoteAddress) -> Self {
        Self {
            monitor: LinkMonitor::new(),
            remote,
        }
    }

    /// Record a PONG from the bridge
    ///
    /// A bridge that comes back after being given up on may have
    /// restarted, so it is told the listener address again.
    pub fn heartbeat(&mut self) {
        let was_alive = self.monitor.is_bridge_alive();
        self.monitor.heartbeat_received();

        if !was_alive {
            info!("Bridge is back, resending remote address");
            if let Err(e) = queue(ControllerMessage::SetRemote(self.remote)) {
                warn!("Failed to queue remote address: {:?}", e);
            }
        }
    }

    pub fn set_network_up(&mut self, up: bool) {
        info!("Bridge network {}", if up { "up" } else { "down" });
        self.monitor.set_network_up(up);
    }

    pub fn update_time(&mut self, delta_ms: u32) {
        let was_alive = self.monitor.is_bridge_alive();
        self.monitor.update_time(delta_ms);

        if was_alive && !self.monitor.is_bridge_alive() {
            warn!(
                "Bridge stopped answering ({} heartbeats missed)",
                self.monitor.missed_heartbeats()
            );
        }
    }
}

impl Reporter for BridgeReporter {
    fn send(&mut self, payload: &[u8]) -> Result<(), NetworkError> {
        if !self.monitor.is_link_up() {
            return Err(NetworkError::LinkDown);
        }
        queue(ControllerMessage::Report(payload))
    }

    fn is_link_up(&self) -> bool {
        self.monitor.is_link_up()
    }

    fn reconnect(&mut self) -> Result<(), NetworkError> {
        queue(ControllerMessage::Reconnect)
    }
}

/// Queue a message for the bridge
pub fn queue(message: ControllerMessage<'_>) -> Result<(), NetworkError> {
    let frame = message.to_frame()?;
    LINK_TX.try_send(frame).map_err(|_| NetworkError::Busy)
}
