//! Message types for the bridge link
//!
//! Message types are divided into two categories:
//! - Controller → Bridge: timer reports, heartbeat, link management
//! - Bridge → Controller: heartbeat responses, network status

use crate::frame::{Frame, FrameError};

// Message type IDs: Controller → Bridge
pub const MSG_REPORT: u8 = 0x10;
pub const MSG_PING: u8 = 0x11;
pub const MSG_RECONNECT: u8 = 0x12;
pub const MSG_SET_REMOTE: u8 = 0x13;

// Message type IDs: Bridge → Controller
pub const MSG_PONG: u8 = 0x30;
pub const MSG_LINK: u8 = 0x31;

/// IPv4 endpoint of the remote listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteAddress {
    pub ip: [u8; 4],
    pub port: u16,
}

impl RemoteAddress {
    /// Payload layout: four address octets followed by the port, big endian
    fn to_bytes(self) -> [u8; 6] {
        let [hi, lo] = self.port.to_be_bytes();
        [self.ip[0], self.ip[1], self.ip[2], self.ip[3], hi, lo]
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, c, d, hi, lo] => Some(Self {
                ip: [*a, *b, *c, *d],
                port: u16::from_be_bytes([*hi, *lo]),
            }),
            _ => None,
        }
    }
}

/// Messages from the controller to the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMessage<'a> {
    /// Encoded [`crate::TimerReport`] to forward to the listener
    Report(&'a [u8]),
    /// Heartbeat request
    Ping,
    /// Ask the bridge to re-associate with the network
    Reconnect,
    /// Configure where reports are forwarded
    SetRemote(RemoteAddress),
}

impl<'a> ControllerMessage<'a> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ControllerMessage::Report(payload) => Frame::new(MSG_REPORT, payload),
            ControllerMessage::Ping => Ok(Frame::empty(MSG_PING)),
            ControllerMessage::Reconnect => Ok(Frame::empty(MSG_RECONNECT)),
            ControllerMessage::SetRemote(remote) => Frame::new(MSG_SET_REMOTE, &remote.to_bytes()),
        }
    }

    /// Parse a controller frame (bridge side, or loopback testing)
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_REPORT => Ok(ControllerMessage::Report(&frame.payload)),
            MSG_PING => Ok(ControllerMessage::Ping),
            MSG_RECONNECT => Ok(ControllerMessage::Reconnect),
            MSG_SET_REMOTE => RemoteAddress::from_bytes(&frame.payload)
                .map(ControllerMessage::SetRemote)
                .ok_or(FrameError::InvalidFrame),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Messages from the bridge to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeMessage {
    /// Heartbeat response
    Pong,
    /// Network association changed
    Link { up: bool },
}

impl BridgeMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PONG => Ok(BridgeMessage::Pong),
            MSG_LINK => match frame.payload.first() {
                Some(&state) => Ok(BridgeMessage::Link { up: state != 0 }),
                None => Err(FrameError::InvalidFrame),
            },
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame (for testing or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            BridgeMessage::Pong => Ok(Frame::empty(MSG_PONG)),
            BridgeMessage::Link { up } => Frame::new(MSG_LINK, &[*up as u8]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{TimerReport, MAX_REPORT_SIZE};

    #[test]
    fn test_set_remote_payload() {
        let remote = RemoteAddress {
            ip: [192, 168, 0, 126],
            port: 31230,
        };
        let frame = ControllerMessage::SetRemote(remote).to_frame().unwrap();

        assert_eq!(frame.msg_type, MSG_SET_REMOTE);
        assert_eq!(&frame.payload[..], &[192, 168, 0, 126, 0x79, 0xFE]);
        assert_eq!(
            ControllerMessage::from_frame(&frame).unwrap(),
            ControllerMessage::SetRemote(remote)
        );
    }

    #[test]
    fn test_set_remote_short_payload_rejected() {
        let frame = Frame::new(MSG_SET_REMOTE, &[10, 0, 0]).unwrap();
        assert_eq!(
            ControllerMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_report_carries_encoded_timer() {
        let report = TimerReport {
            name: heapless::String::try_from("LASER FILTER CLEAN").unwrap(),
            overdue: false,
            current: 4,
            period: 12,
        };
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let bytes = report.encode(&mut buf).unwrap();

        let frame = ControllerMessage::Report(bytes).to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_REPORT);

        match ControllerMessage::from_frame(&frame).unwrap() {
            ControllerMessage::Report(payload) => {
                assert_eq!(TimerReport::decode(payload).unwrap(), report)
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_bridge_link_status() {
        let frame = Frame::new(MSG_LINK, &[1]).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&frame).unwrap(),
            BridgeMessage::Link { up: true }
        );

        let frame = Frame::empty(MSG_LINK);
        assert_eq!(BridgeMessage::from_frame(&frame), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_bridge_pong() {
        let frame = BridgeMessage::Pong.to_frame().unwrap();
        assert_eq!(BridgeMessage::from_frame(&frame).unwrap(), BridgeMessage::Pong);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let frame = Frame::empty(0x7F);
        assert_eq!(BridgeMessage::from_frame(&frame), Err(FrameError::InvalidFrame));
        assert_eq!(
            ControllerMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }
}
