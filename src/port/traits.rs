//! Core trait for the byte-transport seam.
//!
//! `SerialTransport` abstracts the raw byte channel so that both real
//! hardware ports and in-memory mocks can sit under a [`SerialPort`].
//!
//! [`SerialPort`]: crate::SerialPort

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default baud rate (9600 bps).
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-operation timeout (1 s).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration for a serial port.
///
/// Only the parameters the line-delimited core needs are present; richer
/// port options (parity, stop bits, flow control) can be added as defaulted
/// fields later without breaking existing callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Baud rate (bits per second). Both ends must agree.
    #[serde(default = "default_baud")]
    pub baud_rate: u32,

    /// Deadline applied to `read_line` when no explicit deadline is given.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PortSettings {
    /// Settings at the given baud rate with the default timeout.
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    /// Replace the read deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for raw serial byte I/O.
///
/// Implementations are exclusive-ownership handles: dropping the transport
/// releases the underlying OS resource. [`NativeTransport`] wraps real
/// hardware; [`MockTransport`] backs the tests.
///
/// [`NativeTransport`]: super::native::NativeTransport
/// [`MockTransport`]: super::mock::MockTransport
pub trait SerialTransport: Send + std::fmt::Debug {
    /// Write bytes to the port.
    ///
    /// Returns the number of bytes actually accepted, which may be short.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Blocks for at most the
    /// configured timeout.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this port.
    fn name(&self) -> &str;

    /// Set the blocking timeout for subsequent reads and writes.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Reconfigure the baud rate on the open port.
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError>;

    /// Bytes currently waiting in the receive buffer, if the backend can tell.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_settings() {
        let settings = PortSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_helpers() {
        let settings = PortSettings::new(115_200).with_timeout(Duration::from_millis(250));
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: PortSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, PortSettings::default());

        let settings: PortSettings = serde_json::from_str(r#"{"baud_rate": 19200}"#).unwrap();
        assert_eq!(settings.baud_rate, 19_200);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_settings_roundtrip() {
        let original = PortSettings::new(57_600).with_timeout(Duration::from_millis(750));
        let json = serde_json::to_string(&original).unwrap();
        let back: PortSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
