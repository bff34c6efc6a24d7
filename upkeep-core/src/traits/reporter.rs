//! Remote reporting

/// Errors from the reporting link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// The bridge or its network is down
    LinkDown,
    /// Outgoing queue is full
    Busy,
    /// The report did not fit a frame
    Encode,
}

impl From<upkeep_protocol::FrameError> for NetworkError {
    fn from(_: upkeep_protocol::FrameError) -> Self {
        NetworkError::Encode
    }
}

/// Fire-and-forget delivery of timer reports
pub trait Reporter {
    /// Queue an encoded [`upkeep_protocol::TimerReport`] for the listener
    fn send(&mut self, payload: &[u8]) -> Result<(), NetworkError>;

    /// Whether reports can currently reach the listener
    fn is_link_up(&self) -> bool;

    /// Ask the network side to re-associate
    fn reconnect(&mut self) -> Result<(), NetworkError>;
}
