//! Virtual adapter error types.

use lampctl_domain::error::LampError;

/// Errors specific to the virtual transport.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// A control message named a device this transport does not simulate.
    #[error("no simulated bulb `{0}`")]
    UnknownDevice(String),
}

impl From<VirtualError> for LampError {
    fn from(err: VirtualError) -> Self {
        LampError::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_into_transport_error() {
        let err: LampError = VirtualError::UnknownDevice("Attic".to_string()).into();
        assert!(matches!(err, LampError::Transport(_)));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("no simulated bulb `Attic`".to_string())
        );
    }
}
