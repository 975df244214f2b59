//! LIFX adapter error types.

use lampctl_domain::error::LampError;

/// Errors specific to the LIFX adapter.
#[derive(Debug, thiserror::Error)]
pub enum LifxError {
    /// The UDP socket failed.
    #[error("LIFX socket error")]
    Io(#[from] std::io::Error),

    /// A control message named a device that never answered discovery.
    #[error("unknown LIFX device `{0}`")]
    UnknownDevice(String),

    /// A datagram could not be decoded.
    #[error("malformed LIFX packet")]
    Packet(#[from] PacketError),
}

/// Details about why a datagram is not a valid LIFX packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// Fewer bytes than a header.
    #[error("packet of {actual} bytes is shorter than the header")]
    TooShort { actual: usize },

    /// The size field disagrees with the datagram length.
    #[error("packet declares {declared} bytes but carries {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// The protocol number is not 1024.
    #[error("unsupported protocol {0}")]
    Protocol(u16),

    /// A message type this adapter does not handle.
    #[error("unsupported message type {0}")]
    UnknownType(u16),

    /// The payload length does not match the message type.
    #[error("{message} payload must be {expected} bytes, got {actual}")]
    PayloadLength {
        message: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl From<LifxError> for LampError {
    fn from(err: LifxError) -> Self {
        LampError::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_device_error() {
        let err = LifxError::UnknownDevice("Kitchen".to_string());
        assert_eq!(err.to_string(), "unknown LIFX device `Kitchen`");
    }

    #[test]
    fn should_display_payload_length_error() {
        let err = PacketError::PayloadLength {
            message: "LightState",
            expected: 52,
            actual: 10,
        };
        assert_eq!(err.to_string(), "LightState payload must be 52 bytes, got 10");
    }

    #[test]
    fn should_keep_packet_error_as_source() {
        let err = LifxError::from(PacketError::Protocol(2));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("unsupported protocol 2".to_string())
        );
    }

    #[test]
    fn should_convert_into_transport_error() {
        let err: LampError = LifxError::UnknownDevice("Hall".to_string()).into();
        assert!(matches!(err, LampError::Transport(_)));
    }
}
