//! Port-specific error types.
//!
//! Every failure a port operation can hit is an explicit variant here; nothing
//! panics and nothing is retried internally. Retry policy belongs to the
//! caller, since it depends on the protocol running over the line.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The named serial port does not exist on this system.
    #[error("serial port not found: {0}")]
    NotFound(String),

    /// The port exists but is claimed by another process or access was denied.
    #[error("serial port busy or access denied: {0}")]
    Busy(String),

    /// Unsupported baud rate or other bad parameter.
    #[error("invalid port configuration: {0}")]
    InvalidConfig(String),

    /// A read or write deadline elapsed before the operation completed.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O failure during an established session (disconnect, hardware fault).
    #[error("transport fault: {0}")]
    Transport(#[from] std::io::Error),

    /// Operation attempted on a closed or never-opened port.
    #[error("port is not open")]
    NotOpen,
}

impl PortError {
    /// Create a `NotFound` error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a `Busy` error from a port name.
    pub fn busy(port_name: impl Into<String>) -> Self {
        Self::Busy(port_name.into())
    }

    /// Create an `InvalidConfig` error from a message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a `Timeout` error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "serial port not found: /dev/ttyUSB0");

        let err = PortError::busy("COM3");
        assert_eq!(err.to_string(), "serial port busy or access denied: COM3");

        let err = PortError::invalid_config("unsupported baud rate 31");
        assert_eq!(
            err.to_string(),
            "invalid port configuration: unsupported baud rate 31"
        );

        let err = PortError::NotOpen;
        assert_eq!(err.to_string(), "port is not open");
    }

    #[test]
    fn test_timeout_error() {
        let duration = std::time::Duration::from_millis(500);
        let err = PortError::timeout(duration);
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "cable pulled");
        let err: PortError = io_err.into();
        assert!(matches!(err, PortError::Transport(_)));
        assert!(err.to_string().contains("cable pulled"));
    }
}
