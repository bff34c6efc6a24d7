//! Bridge link health
//!
//! The network bridge answers a PING with a PONG once per second and
//! announces its network state with LINK messages. Reports are only
//! worth sending while both are healthy.

/// Heartbeat window
pub const HEARTBEAT_TIMEOUT_MS: u32 = 3000;
/// Missed windows before the bridge is considered gone
pub const MAX_MISSED_HEARTBEATS: u8 = 3;

#[derive(Debug, Clone, Default)]
pub struct LinkMonitor {
    /// Missed heartbeat count
    missed_heartbeats: u8,
    /// Time since last heartbeat (ms)
    time_since_heartbeat_ms: u32,
    /// Last network state announced by the bridge
    network_up: bool,
}

impl LinkMonitor {
    /// Create a monitor with the network down
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heartbeat received
    pub fn heartbeat_received(&mut self) {
        self.missed_heartbeats = 0;
        self.time_since_heartbeat_ms = 0;
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        self.time_since_heartbeat_ms = self.time_since_heartbeat_ms.saturating_add(delta_ms);

        if self.time_since_heartbeat_ms >= HEARTBEAT_TIMEOUT_MS {
            self.missed_heartbeats = self.missed_heartbeats.saturating_add(1);
            self.time_since_heartbeat_ms = 0;
        }
    }

    /// Record the bridge's network state
    pub fn set_network_up(&mut self, up: bool) {
        self.network_up = up;
    }

    /// Bridge answered recently
    pub fn is_bridge_alive(&self) -> bool {
        self.missed_heartbeats < MAX_MISSED_HEARTBEATS
    }

    /// Reports can reach the listener
    pub fn is_link_up(&self) -> bool {
        self.is_bridge_alive() && self.network_up
    }

    pub fn missed_heartbeats(&self) -> u8 {
        self.missed_heartbeats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_down_until_network_reported() {
        let mut monitor = LinkMonitor::new();
        assert!(monitor.is_bridge_alive());
        assert!(!monitor.is_link_up());

        monitor.set_network_up(true);
        assert!(monitor.is_link_up());
    }

    #[test]
    fn test_link_lost_after_missed_heartbeats() {
        let mut monitor = LinkMonitor::new();
        monitor.set_network_up(true);

        for _ in 0..MAX_MISSED_HEARTBEATS {
            monitor.update_time(HEARTBEAT_TIMEOUT_MS);
        }

        assert!(!monitor.is_bridge_alive());
        assert!(!monitor.is_link_up());
    }

    #[test]
    fn test_heartbeat_resets_counter() {
        let mut monitor = LinkMonitor::new();

        monitor.update_time(HEARTBEAT_TIMEOUT_MS);
        monitor.update_time(HEARTBEAT_TIMEOUT_MS);
        assert_eq!(monitor.missed_heartbeats(), 2);

        monitor.heartbeat_received();
        assert_eq!(monitor.missed_heartbeats(), 0);
        assert!(monitor.is_bridge_alive());
    }

    #[test]
    fn test_partial_windows_accumulate() {
        let mut monitor = LinkMonitor::new();
        for _ in 0..29 {
            monitor.update_time(100);
        }
        assert_eq!(monitor.missed_heartbeats(), 0);

        monitor.update_time(100);
        assert_eq!(monitor.missed_heartbeats(), 1);
    }
}
